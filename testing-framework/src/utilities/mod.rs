// File: testing-framework/src/utilities/mod.rs
//
// Testing Utilities
//
// Failure artifacts and their replay helpers.

/// Failure artifact collection for test debugging and reproduction
pub mod artifacts;

/// Artifact replay utilities for reproducing test failures
pub mod replay;

// Re-export commonly used utilities
pub use artifacts::{ArtifactCollector, ProblemArtifact, RecordsArtifact, TestArtifact};
pub use replay::{get_replay_command, load_artifact, print_artifact_summary, validate_artifact};
