use primitive_types::U256;
use thiserror::Error;

/// Why a single candidate circle was not accepted.
///
/// Drives the next generator iteration and is only surfaced to callers
/// that check a specific circle (`validate_solution`, `advance`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandidateRejection {
    #[error("circle is not fully inside the problem bounds")]
    OutOfBounds,

    #[error("radius is below the configured minimum")]
    RadiusBelowMinimum,

    #[error("circle overlaps accepted circle #{index}")]
    Overlaps { index: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CircleError {
    #[error("Invalid problem configuration: {0}")]
    InvalidConfig(String),

    /// Remote state failed validation at the boundary
    #[error("Malformed problem snapshot: {0}")]
    MalformedSnapshot(String),

    /// No acceptable candidate within the iteration budget.
    /// Recoverable: retry from `next_seed` or with a fresh seed.
    #[error("No valid circle found within {budget} iterations")]
    Exhausted { budget: u64, next_seed: U256 },

    #[error("Problem already holds its maximum number of circles")]
    AlreadyFinished,

    #[error("Candidate rejected: {0}")]
    Rejected(#[from] CandidateRejection),
}

impl CircleError {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, CircleError::Exhausted { .. })
    }
}
