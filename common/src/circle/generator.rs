//! Hash-chained candidate generation.
//!
//! For a call starting at seed `s_0`, iteration `i` computes
//!
//! ```text
//! h_i     = keccak256(be32(s_i) || be32(i))
//! s_{i+1} = keccak256(be32(h_i))
//! ```
//!
//! and derives a candidate from `h_i`: `x` from the low bits, `y` from
//! `h >> 80` and the radius from `h >> 160`, each reduced modulo the
//! inclusive span of its range. The counter restarts at 0 on every call.

use log::{debug, trace};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::{check_candidate, Circle, CircleError, ProblemConfig};
use crate::crypto::keccak256_parts;
use crate::utils::u256_to_be_bytes;

/// An accepted candidate and the chain position that produced it.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircleProposal {
    pub circle: Circle,
    /// Seed of the iteration that produced the circle
    pub consumed_seed: U256,
    pub next_seed: U256,
    pub iterations_used: u64,
}

/// One link of the chain: `(h_i, s_{i+1})`.
pub fn chain_step(seed: &U256, iteration: u64) -> (U256, U256) {
    let h = keccak256_parts(&[
        &u256_to_be_bytes(seed),
        &u256_to_be_bytes(&U256::from(iteration)),
    ]);
    let next = keccak256_parts(&[h.as_bytes()]);
    (h.to_u256(), next.to_u256())
}

/// Map a chain value to a candidate circle inside the configured ranges.
pub fn derive_candidate(config: &ProblemConfig, h: &U256) -> Circle {
    let x = config.min_x + (*h % config.span_x());
    let y = config.min_y + ((*h >> 80u32) % config.span_y());
    let radius = config.min_radius + ((*h >> 160u32) % config.span_radius());
    Circle::new(x, y, radius)
}

/// Run the chain from `seed` until a candidate is accepted against
/// `accepted`, or `budget` iterations have been spent.
pub fn generate_candidate(
    config: &ProblemConfig,
    accepted: &[Circle],
    seed: U256,
    budget: u64,
) -> Result<CircleProposal, CircleError> {
    config.validate()?;

    let mut current = seed;
    for iteration in 0..budget {
        let (h, next) = chain_step(&current, iteration);
        let circle = derive_candidate(config, &h);
        match check_candidate(config, accepted, &circle) {
            Ok(()) => {
                debug!(
                    "accepted circle ({}, {}, r={}) after {} iterations",
                    circle.x,
                    circle.y,
                    circle.radius,
                    iteration + 1
                );
                return Ok(CircleProposal {
                    circle,
                    consumed_seed: current,
                    next_seed: next,
                    iterations_used: iteration + 1,
                });
            }
            Err(reason) => {
                trace!("iteration {}: candidate rejected: {}", iteration, reason);
            }
        }
        current = next;
    }

    Err(CircleError::Exhausted {
        budget,
        next_seed: current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keccak256;

    fn config() -> ProblemConfig {
        ProblemConfig::square(1000, 10, 100)
    }

    #[test]
    fn test_chain_step_layout() {
        let seed = U256::one();
        let (h, next) = chain_step(&seed, 3);

        let mut input = [0u8; 64];
        input[31] = 1;
        input[63] = 3;
        let expected_h = keccak256(&input).to_u256();
        assert_eq!(h, expected_h);
        assert_eq!(next, keccak256(&u256_to_be_bytes(&expected_h)).to_u256());
    }

    #[test]
    fn test_derived_candidate_stays_in_ranges() {
        let cfg = config();
        for i in 0..200u64 {
            let (h, _) = chain_step(&U256::from(i), i);
            let c = derive_candidate(&cfg, &h);
            assert!(c.x <= cfg.max_x && c.y <= cfg.max_y);
            assert!(c.radius >= cfg.min_radius && c.radius <= cfg.max_radius);
        }
    }

    #[test]
    fn test_derive_candidate_uses_shifted_words() {
        // Power-of-two spans make each reduction a plain bit mask
        let cfg = ProblemConfig {
            min_x: U256::zero(),
            max_x: U256::from(1023u64),
            min_y: U256::zero(),
            max_y: U256::from(1023u64),
            min_radius: U256::from(16u64),
            max_radius: U256::from(271u64),
        };
        let h = U256::from(7u64) | (U256::from(11u64) << 80u32) | (U256::from(5u64) << 160u32);
        assert_eq!(derive_candidate(&cfg, &h), Circle::from_u64(7, 11, 21));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let cfg = config();
        let accepted = [Circle::from_u64(500, 500, 100)];
        let a = generate_candidate(&cfg, &accepted, U256::from(42u64), 1000);
        let b = generate_candidate(&cfg, &accepted, U256::from(42u64), 1000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_proposal_matches_chain_position() {
        let cfg = config();
        let accepted = [Circle::from_u64(300, 300, 100), Circle::from_u64(700, 700, 100)];
        let proposal = generate_candidate(&cfg, &accepted, U256::one(), 10_000).unwrap();

        let mut seed = U256::one();
        for i in 0..proposal.iterations_used - 1 {
            seed = chain_step(&seed, i).1;
        }
        assert_eq!(proposal.consumed_seed, seed);
        let (h, next) = chain_step(&seed, proposal.iterations_used - 1);
        assert_eq!(proposal.next_seed, next);
        assert_eq!(proposal.circle, derive_candidate(&cfg, &h));
    }

    #[test]
    fn test_zero_budget_is_exhausted() {
        let seed = U256::from(9u64);
        assert_eq!(
            generate_candidate(&config(), &[], seed, 0),
            Err(CircleError::Exhausted {
                budget: 0,
                next_seed: seed
            })
        );
    }

    #[test]
    fn test_exhausted_reports_chain_position() {
        let cfg = config();
        // A circle covering the whole area leaves no room
        let blocker = [Circle::from_u64(500, 500, 1000)];
        let err = generate_candidate(&cfg, &blocker, U256::from(5u64), 3).unwrap_err();

        let mut seed = U256::from(5u64);
        for i in 0..3 {
            seed = chain_step(&seed, i).1;
        }
        assert_eq!(
            err,
            CircleError::Exhausted {
                budget: 3,
                next_seed: seed
            }
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = ProblemConfig::square(10, 10, 100);
        assert!(matches!(
            generate_candidate(&cfg, &[], U256::one(), 10),
            Err(CircleError::InvalidConfig(_))
        ));
    }
}
