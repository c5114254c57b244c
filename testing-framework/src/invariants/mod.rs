//! Core invariant checkers
//!
//! - Circle placement (bounds, minimum radius, pairwise non-overlap)
//! - Problem state consistency (count vs maximum vs finished flag)
//! - Replay equivalence (local simulator ≡ authoritative contract)
//! - Island uniqueness
//! - Balance conservation

use anyhow::{bail, ensure, Context, Result};
use primitive_types::U256;
use std::collections::BTreeMap;

use randao_common::circle::{check_candidate, Circle, CircleError, ProblemConfig, ProblemState};
use randao_common::record::Island;

/// Every circle lies inside the area, meets the minimum radius, and no two
/// circles overlap.
pub fn check_circles_placement(config: &ProblemConfig, circles: &[Circle]) -> Result<()> {
    for (i, circle) in circles.iter().enumerate() {
        check_candidate(config, &circles[..i], circle)
            .with_context(|| format!("circle #{} ({:?}) breaks placement", i, circle))?;
    }
    Ok(())
}

/// Count never exceeds the maximum, the finished flag matches the count,
/// and the circles satisfy `check_circles_placement`.
pub fn check_problem_state(state: &ProblemState) -> Result<()> {
    ensure!(
        state.circle_count() <= state.max_circles(),
        "{} circles exceed the maximum of {}",
        state.circle_count(),
        state.max_circles()
    );
    ensure!(
        state.is_finished() == (state.circle_count() == state.max_circles()),
        "finished flag {} disagrees with {}/{} circles",
        state.is_finished(),
        state.circle_count(),
        state.max_circles()
    );
    check_circles_placement(state.config(), state.accepted_circles())
}

/// Run `transactions` insertion transactions locally, each trying
/// `attempts_per_tx` candidates, exactly as the contract does.
pub fn replay_problem(
    config: ProblemConfig,
    seed: U256,
    max_circles: usize,
    attempts_per_tx: u64,
    transactions: u64,
) -> Result<ProblemState> {
    let mut state = ProblemState::new(config, seed, max_circles)?;
    for tx in 0..transactions {
        ensure!(
            !state.is_finished(),
            "transaction {} of {} sent after the problem finished",
            tx + 1,
            transactions
        );
        match state.insert(attempts_per_tx) {
            Ok(_) => {}
            Err(CircleError::Exhausted { next_seed, .. }) => state.reseed(next_seed)?,
            Err(e) => {
                return Err(e).with_context(|| format!("replay failed at transaction {}", tx))
            }
        }
    }
    Ok(state)
}

/// Local replay and contract agree on seed, circles and status.
pub fn check_replay_equivalence(contract: &ProblemState, replayed: &ProblemState) -> Result<()> {
    if let Some(i) = contract
        .accepted_circles()
        .iter()
        .zip(replayed.accepted_circles())
        .position(|(a, b)| a != b)
    {
        bail!(
            "circle #{} differs: contract {:?}, replay {:?}",
            i,
            contract.accepted_circles()[i],
            replayed.accepted_circles()[i]
        );
    }
    ensure!(
        contract.circle_count() == replayed.circle_count(),
        "circle count differs: contract {}, replay {}",
        contract.circle_count(),
        replayed.circle_count()
    );
    ensure!(
        contract.seed() == replayed.seed(),
        "chain seed differs: contract {:#x}, replay {:#x}",
        contract.seed(),
        replayed.seed()
    );
    ensure!(
        contract.is_finished() == replayed.is_finished(),
        "status differs"
    );
    Ok(())
}

/// No island id appears twice.
pub fn check_island_uniqueness(islands: &[Island]) -> Result<()> {
    let mut owners = BTreeMap::new();
    for island in islands {
        if let Some(previous) = owners.insert(island.island_id, island.owner) {
            bail!(
                "island {} owned by both {} and {}",
                island.island_id,
                previous,
                island.owner
            );
        }
    }
    Ok(())
}

/// Value is only moved, never created or burned.
pub fn check_balance_conservation(total_before: U256, total_after: U256) -> Result<()> {
    ensure!(
        total_before == total_after,
        "total supply changed from {} to {}",
        total_before,
        total_after
    );
    Ok(())
}
