//! Property-based tests for the circle packing simulator.
//!
//! Properties tested:
//! - configure(to_snapshot(s)) reproduces s
//! - accepted circles never overlap and stay inside the bounds
//! - generation from a fixed seed and circle set is deterministic
//! - advance grows the circle set by exactly one and finishes exactly once

use primitive_types::U256;
use proptest::prelude::*;
use randao_common::circle::{
    check_candidate, CircleError, ProblemConfig, ProblemSnapshot, ProblemState, ProblemStatus,
};

const BUDGET: u64 = 10_000;

fn config() -> ProblemConfig {
    ProblemConfig::square(1000, 10, 60)
}

fn seed_strategy() -> impl Strategy<Value = U256> {
    any::<[u8; 32]>().prop_map(|bytes| U256::from_big_endian(&bytes))
}

/// Fill a problem from `seed`, stopping at the first exhaustion.
fn packed_state(seed: U256, max_circles: usize) -> ProblemState {
    let mut state = ProblemState::new(config(), seed, max_circles).unwrap();
    while !state.is_finished() {
        if state.insert(BUDGET).is_err() {
            break;
        }
    }
    state
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_snapshot_roundtrip(seed in seed_strategy(), max in 1usize..6) {
        let state = packed_state(seed, max);
        let snapshot = state.to_snapshot();

        let restored = ProblemState::configure(*state.config(), &snapshot).unwrap();
        prop_assert_eq!(&restored, &state);

        // Through the loosely typed form as well
        let from_value = ProblemState::from_value(*state.config(), &snapshot.to_value()).unwrap();
        prop_assert_eq!(from_value.accepted_circles(), state.accepted_circles());
        prop_assert_eq!(from_value.is_finished(), state.is_finished());
    }

    #[test]
    fn test_accepted_circles_never_overlap(seed in seed_strategy(), max in 2usize..10) {
        let state = packed_state(seed, max);
        let circles = state.accepted_circles();
        for (i, a) in circles.iter().enumerate() {
            prop_assert!(state.config().check_placement(a).is_ok());
            for b in &circles[i + 1..] {
                let dx = if a.x > b.x { a.x - b.x } else { b.x - a.x };
                let dy = if a.y > b.y { a.y - b.y } else { b.y - a.y };
                let reach = a.radius + b.radius;
                prop_assert!(dx * dx + dy * dy >= reach * reach);
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic(seed in seed_strategy(), prefix_seed in seed_strategy()) {
        let base = packed_state(prefix_seed, 4);
        let snapshot = ProblemSnapshot {
            seed,
            circles: base.accepted_circles().to_vec(),
            max_circles: U256::from(8u64),
            is_finished: false,
        };
        let state = ProblemState::configure(config(), &snapshot).unwrap();
        let first = state.generate_candidate(BUDGET);
        let second = state.generate_candidate(BUDGET);
        prop_assert_eq!(&first, &second);

        if let Ok(proposal) = first {
            prop_assert!(check_candidate(state.config(), state.accepted_circles(), &proposal.circle).is_ok());
        }
    }

    #[test]
    fn test_advance_is_monotonic(seed in seed_strategy(), max in 1usize..6) {
        let mut state = ProblemState::new(config(), seed, max).unwrap();
        let mut finished_transitions = 0;

        while state.status() == ProblemStatus::Collecting {
            let proposal = match state.generate_candidate(BUDGET) {
                Ok(proposal) => proposal,
                Err(CircleError::Exhausted { .. }) => break,
                Err(e) => return Err(TestCaseError::fail(e.to_string())),
            };
            let next = state.advance(&proposal).unwrap();
            prop_assert_eq!(next.circle_count(), state.circle_count() + 1);
            prop_assert_eq!(next.seed(), proposal.next_seed);
            if next.is_finished() {
                finished_transitions += 1;
                prop_assert_eq!(next.circle_count(), max);
            }
            state = next;
        }

        if state.is_finished() {
            prop_assert_eq!(finished_transitions, 1);
            prop_assert_eq!(state.generate_candidate(BUDGET), Err(CircleError::AlreadyFinished));
        }
    }
}

#[test]
fn test_end_to_end_three_circles() {
    // seed 0x00..01, 3 circles in [0, 1000]^2 with minimum radius 10
    let config = ProblemConfig::square(1000, 10, 100);
    let mut state = ProblemState::new(config, U256::one(), 3).unwrap();

    let mut iterations = 0;
    while !state.is_finished() {
        let proposal = state.insert(10_000).unwrap();
        iterations += proposal.iterations_used;
    }

    assert!(iterations <= 30_000);
    assert_eq!(state.circle_count(), 3);
    assert_eq!(state.status(), ProblemStatus::Finished);

    let circles = state.accepted_circles();
    for i in 0..circles.len() {
        for j in i + 1..circles.len() {
            assert!(!circles[i].overlaps(&circles[j]));
        }
    }
}

#[test]
fn test_malformed_values_are_rejected_before_state() {
    let values = [
        serde_json::json!({"seed": 1, "circles": [[500, 500, 20]], "max_circles": 1, "is_finished": false}),
        serde_json::json!({"seed": 1, "circles": [[500, 500, 20], [505, 500, 20]], "max_circles": 3, "is_finished": false}),
        serde_json::json!({"seed": "-1", "circles": [], "max_circles": 1, "is_finished": false}),
        serde_json::json!([1, [], 1]),
    ];
    for value in values {
        assert!(matches!(
            ProblemState::from_value(config(), &value),
            Err(CircleError::MalformedSnapshot(_))
        ));
    }
}
