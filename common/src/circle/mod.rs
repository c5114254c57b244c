//! Deterministic circle packing simulator.
//!
//! Mirrors the circle problem contract value for value: the same hash
//! chain picks candidates and the same integer predicate accepts them, so
//! a circle accepted here validates on the ledger and vice versa.

mod error;
mod generator;
mod geometry;
mod problem;
mod snapshot;

pub use error::{CandidateRejection, CircleError};
pub use generator::{chain_step, derive_candidate, generate_candidate, CircleProposal};
pub use geometry::{check_candidate, Circle, ProblemConfig};
pub use problem::{ProblemState, ProblemStatus};
pub use snapshot::{parse_u256, ProblemSnapshot};
