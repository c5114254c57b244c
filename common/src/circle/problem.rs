use log::debug;
use primitive_types::U256;
use serde::Serialize;
use serde_json::Value;

use super::{
    check_candidate, generate_candidate, CandidateRejection, Circle, CircleError, CircleProposal,
    ProblemConfig, ProblemSnapshot,
};
use crate::config::MAX_CIRCLES;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemStatus {
    Collecting,
    Finished,
}

/// Local mirror of a circle problem.
///
/// `accepted_circles.len() <= max_circles` always holds and `is_finished`
/// is true exactly when the two are equal. A finished state never changes.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ProblemState {
    config: ProblemConfig,
    seed: U256,
    accepted_circles: Vec<Circle>,
    max_circles: usize,
    is_finished: bool,
}

fn check_max_circles(max_circles: U256) -> Result<usize, CircleError> {
    if max_circles.is_zero() || max_circles > U256::from(MAX_CIRCLES) {
        return Err(CircleError::MalformedSnapshot(format!(
            "max_circles {} is outside 1..={}",
            max_circles, MAX_CIRCLES
        )));
    }
    Ok(max_circles.low_u64() as usize)
}

impl ProblemState {
    /// Empty problem, as freshly deployed.
    pub fn new(config: ProblemConfig, seed: U256, max_circles: usize) -> Result<Self, CircleError> {
        config.validate()?;
        if max_circles == 0 || max_circles > MAX_CIRCLES {
            return Err(CircleError::InvalidConfig(format!(
                "max_circles {} is outside 1..={}",
                max_circles, MAX_CIRCLES
            )));
        }
        Ok(Self {
            config,
            seed,
            accepted_circles: Vec::new(),
            max_circles,
            is_finished: false,
        })
    }

    /// Build a state from a remote snapshot, rejecting anything that breaks
    /// the state invariants or the acceptance rules.
    pub fn configure(config: ProblemConfig, snapshot: &ProblemSnapshot) -> Result<Self, CircleError> {
        config.validate()?;
        let max_circles = check_max_circles(snapshot.max_circles)?;
        let count = snapshot.circles.len();

        if count > max_circles {
            return Err(CircleError::MalformedSnapshot(format!(
                "{} circles exceed the maximum of {}",
                count, max_circles
            )));
        }
        if snapshot.is_finished != (count == max_circles) {
            return Err(CircleError::MalformedSnapshot(format!(
                "is_finished is {} with {} of {} circles",
                snapshot.is_finished, count, max_circles
            )));
        }

        for (index, circle) in snapshot.circles.iter().enumerate() {
            if !circle.within_range() {
                return Err(CircleError::MalformedSnapshot(format!(
                    "circle #{index} exceeds the maximum coordinate"
                )));
            }
            match check_candidate(&config, &snapshot.circles[..index], circle) {
                Ok(()) => {}
                Err(CandidateRejection::Overlaps { index: other }) => {
                    return Err(CircleError::MalformedSnapshot(format!(
                        "circle #{index} overlaps circle #{other}"
                    )))
                }
                Err(reason) => {
                    return Err(CircleError::MalformedSnapshot(format!(
                        "circle #{index}: {reason}"
                    )))
                }
            }
        }

        Ok(Self {
            config,
            seed: snapshot.seed,
            accepted_circles: snapshot.circles.clone(),
            max_circles,
            is_finished: snapshot.is_finished,
        })
    }

    /// Parse and configure in one step.
    pub fn from_value(config: ProblemConfig, value: &Value) -> Result<Self, CircleError> {
        Self::configure(config, &ProblemSnapshot::from_value(value)?)
    }

    pub fn to_snapshot(&self) -> ProblemSnapshot {
        ProblemSnapshot {
            seed: self.seed,
            circles: self.accepted_circles.clone(),
            max_circles: U256::from(self.max_circles),
            is_finished: self.is_finished,
        }
    }

    pub fn config(&self) -> &ProblemConfig {
        &self.config
    }

    pub fn seed(&self) -> U256 {
        self.seed
    }

    pub fn accepted_circles(&self) -> &[Circle] {
        &self.accepted_circles
    }

    pub fn circle_count(&self) -> usize {
        self.accepted_circles.len()
    }

    pub fn max_circles(&self) -> usize {
        self.max_circles
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    pub fn status(&self) -> ProblemStatus {
        if self.is_finished {
            ProblemStatus::Finished
        } else {
            ProblemStatus::Collecting
        }
    }

    /// Next candidate from the current seed against the accepted circles.
    pub fn generate_candidate(&self, budget: u64) -> Result<CircleProposal, CircleError> {
        if self.is_finished {
            return Err(CircleError::AlreadyFinished);
        }
        generate_candidate(&self.config, &self.accepted_circles, self.seed, budget)
    }

    /// Whether `circle` would be accepted next.
    pub fn validate_solution(&self, circle: &Circle) -> Result<(), CandidateRejection> {
        check_candidate(&self.config, &self.accepted_circles, circle)
    }

    /// New state with the proposal applied; `self` is left untouched.
    pub fn advance(&self, proposal: &CircleProposal) -> Result<Self, CircleError> {
        let mut next = self.clone();
        next.apply(proposal)?;
        Ok(next)
    }

    /// In-place form of `advance`. The proposal is re-checked, so one
    /// generated against a different state cannot break the invariants.
    pub fn apply(&mut self, proposal: &CircleProposal) -> Result<(), CircleError> {
        if self.is_finished {
            return Err(CircleError::AlreadyFinished);
        }
        self.validate_solution(&proposal.circle)?;

        self.accepted_circles.push(proposal.circle);
        self.seed = proposal.next_seed;
        self.is_finished = self.accepted_circles.len() == self.max_circles;
        debug!(
            "circle {}/{} accepted, finished: {}",
            self.accepted_circles.len(),
            self.max_circles,
            self.is_finished
        );
        Ok(())
    }

    /// Generate and apply. On error the state is unchanged.
    pub fn insert(&mut self, budget: u64) -> Result<CircleProposal, CircleError> {
        let proposal = self.generate_candidate(budget)?;
        self.apply(&proposal)?;
        Ok(proposal)
    }

    /// Move the chain to `seed` without accepting a circle, as the contract
    /// does after an exhausted insertion transaction.
    pub fn reseed(&mut self, seed: U256) -> Result<(), CircleError> {
        if self.is_finished {
            return Err(CircleError::AlreadyFinished);
        }
        self.seed = seed;
        Ok(())
    }
}
