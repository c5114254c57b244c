//! Fill a circle problem on the ledger, mirror it locally and check a
//! freshly generated test circle against the contract.

use anyhow::{bail, ensure, Context, Result};
use log::{debug, info, warn};
use primitive_types::U256;
use serde::Serialize;

use randao_common::circle::{generate_candidate, Circle, ProblemState};
use randao_common::crypto::Address;
use randao_common::ledger::{CircleProblemLedger, EventKind, InsertAttempt, LedgerEvent};

use super::ScenarioContext;
use crate::invariants::{check_problem_state, check_replay_equivalence, replay_problem};
use crate::utilities::ProblemArtifact;

#[derive(Debug, Clone, Serialize)]
pub struct ProblemFormationReport {
    pub contract: Address,
    pub deploy_seed: U256,
    pub max_circles: u64,
    pub insert_transactions: u64,
    /// Transactions that ran out of attempts without adding a circle
    pub exhausted_transactions: u64,
    pub circles: Vec<Circle>,
    pub test_circle: Circle,
    pub test_circle_iterations: u64,
}

/// Send insertion transactions until the problem reports finished, reading
/// every outcome from the `AttemptInsertingCircle` event of its block.
pub async fn insert_until_finished<C>(problem: &C, max_transactions: u64) -> Result<Vec<InsertAttempt>>
where
    C: CircleProblemLedger + ?Sized,
{
    let mut attempts: Vec<InsertAttempt> = Vec::new();
    loop {
        if attempts.len() as u64 >= max_transactions {
            bail!(
                "problem not finished after {} insertion transactions",
                max_transactions
            );
        }

        let attempt = problem
            .submit_insert_attempt()
            .await
            .context("Failed to send insertion transaction")?;
        let block = attempt.receipt.block_number;
        let events = problem
            .query_events(EventKind::AttemptInsertingCircle, block, block)
            .await
            .context("Failed to query AttemptInsertingCircle events")?;
        let [event] = events.as_slice() else {
            bail!(
                "expected one AttemptInsertingCircle event in block {}, found {}",
                block,
                events.len()
            );
        };
        let LedgerEvent::AttemptInsertingCircle {
            is_finished,
            circle_count,
        } = event.event
        else {
            bail!("unexpected event {:?} in block {}", event.event, block);
        };
        ensure!(
            is_finished == attempt.is_finished && circle_count == attempt.circle_count,
            "event in block {} disagrees with the receipt",
            block
        );

        let previous = attempts.last().map_or(0, |a| a.circle_count);
        if circle_count == previous {
            warn!(
                "transaction {} found no circle, sending another",
                attempts.len() + 1
            );
        } else {
            debug!("block {}: {} circles, finished: {}", block, circle_count, is_finished);
        }

        attempts.push(attempt);
        if is_finished {
            return Ok(attempts);
        }
    }
}

pub async fn run_problem_formation(ctx: &mut ScenarioContext) -> Result<ProblemFormationReport> {
    let settings = ctx.config.problem.clone();
    let config = settings.problem_config();
    let deploy_seed = ctx.env.rng.gen_u256();

    let problem = ctx.ledger.deploy_circle_problem(
        deploy_seed,
        config,
        settings.max_circles,
        settings.attempts_per_tx,
    )?;
    ctx.artifacts.set_problem(ProblemArtifact {
        contract: problem.address(),
        deploy_seed,
        insert_transactions: 0,
        snapshot: None,
    });

    let max_circles = problem.maximum_circle_count().await?;
    info!(
        "Circle problem {} deployed, filling up to {} circles",
        problem.address(),
        max_circles
    );

    let attempts = insert_until_finished(&problem, settings.max_insert_transactions).await;
    let snapshot = problem.problem_snapshot().await?;
    if let Some(artifact) = ctx.artifacts.problem_mut() {
        artifact.insert_transactions = attempts.as_ref().map_or(0, |a| a.len() as u64);
        artifact.snapshot = Some(snapshot.clone());
    }
    let attempts = attempts?;
    let insert_transactions = attempts.len() as u64;

    // Local mirror built from the raw snapshot
    let state = ProblemState::from_value(config, &snapshot).context("Snapshot rejected")?;
    if let Some(artifact) = ctx.artifacts.problem_mut() {
        artifact.snapshot = Some(state.to_snapshot().to_value());
    }
    ensure!(state.is_finished(), "snapshot does not report a finished problem");
    ensure!(
        state.max_circles() as u64 == max_circles,
        "snapshot maximum {} differs from the contract's {}",
        state.max_circles(),
        max_circles
    );
    check_problem_state(&state)?;

    let replayed = replay_problem(
        config,
        deploy_seed,
        settings.max_circles,
        settings.attempts_per_tx,
        insert_transactions,
    )?;
    check_replay_equivalence(&state, &replayed).context("Local replay diverged")?;

    // A fresh circle from the deploy seed must fit among the accepted ones
    let proposal = generate_candidate(
        &config,
        state.accepted_circles(),
        deploy_seed,
        settings.test_circle_budget,
    )
    .context("Failed to generate test circle")?;
    let circle = proposal.circle;
    let accepted = problem
        .validate_solution(circle.x, circle.y, circle.radius)
        .await?;
    ensure!(
        accepted,
        "contract rejected test circle ({}, {}, {})",
        circle.x,
        circle.y,
        circle.radius
    );
    ensure!(
        state.validate_solution(&circle).is_ok(),
        "local mirror rejects a circle the contract accepts"
    );

    let exhausted_transactions = insert_transactions - state.circle_count() as u64;
    info!(
        "{} circles in {} transactions ({} exhausted), test circle found after {} iterations",
        state.circle_count(),
        insert_transactions,
        exhausted_transactions,
        proposal.iterations_used
    );

    Ok(ProblemFormationReport {
        contract: problem.address(),
        deploy_seed,
        max_circles,
        insert_transactions,
        exhausted_transactions,
        circles: state.accepted_circles().to_vec(),
        test_circle: circle,
        test_circle_iterations: proposal.iterations_used,
    })
}
