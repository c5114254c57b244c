//! # FREE_RANDAO Testing Harness
//!
//! Deterministic orchestration of the FREE_RANDAO flows against an
//! in-process ledger.
//!
//! ## Architecture Overview
//!
//! - **orchestrator**: seeded RNG and the deterministic environment
//! - **ledger**: auto-mining chain with the circle problem and registry
//!   contracts
//! - **scenarios**: problem formation, records signature and campaigns
//! - **invariants**: checks shared by scenarios and tests
//! - **utilities**: failure artifacts and their replay
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use randao_testing_framework::prelude::*;
//!
//! #[tokio::test]
//! async fn test_problem_formation() -> anyhow::Result<()> {
//!     let config = HarnessConfig {
//!         rng_seed: Some(42),
//!         ..Default::default()
//!     };
//!     let mut ctx = ScenarioContext::new(config)?;
//!     let report = execute(&mut ctx, ScenarioKind::ProblemFormation).await;
//!     assert!(report.success, "{:?}", report.error);
//!     Ok(())
//! }
//! ```
//!
//! Every run prints its seed; set `RANDAO_TEST_SEED` to replay it.

#![warn(clippy::all)]

/// Harness configuration
pub mod config;

// Invariant checkers (placement, replay equivalence, balance conservation)
pub mod invariants;

/// In-process ledger and contracts
pub mod ledger;

/// Core orchestration - provides RNG and deterministic environment
pub mod orchestrator;

pub mod scenarios;

/// Failure artifacts and replay
pub mod utilities;

// Convenient re-exports for common usage
pub mod prelude;

// Re-export commonly used types at crate root
pub use config::HarnessConfig;
pub use ledger::{TestLedger, TestLedgerBuilder};
pub use orchestrator::{DeterministicTestEnv, ReplayTarget, TestRng};

/// Harness version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
