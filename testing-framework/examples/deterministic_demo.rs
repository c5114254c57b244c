// Example: Deterministic Harness Demo
//
// Shows how one seed drives a whole run:
// - Seeded RNG (TestRng)
// - Circle problem deployed with a seed drawn from it
// - The same seed replays the same circles
//
// Run this example with:
//   cargo run --example deterministic_demo
//
// To reproduce with a specific seed:
//   RANDAO_TEST_SEED=0x1234567890abcdef cargo run --example deterministic_demo

use anyhow::Result;
use randao_testing_framework::prelude::*;
use randao_testing_framework::scenarios::insert_until_finished;

#[tokio::main]
async fn main() -> Result<()> {
    println!("========================================");
    println!("FREE_RANDAO Harness");
    println!("Deterministic Infrastructure Demo");
    println!("========================================\n");

    demo_test_rng();
    demo_seeded_problem().await?;
    demo_seed_replay();

    println!("\n========================================");
    println!("All demos completed successfully!");
    println!("========================================");
    Ok(())
}

/// Demo 1: TestRng (Seeded Randomness)
fn demo_test_rng() {
    println!("Demo 1: TestRng (Seeded Random)");
    println!("--------------------------------");

    let rng1 = TestRng::with_seed(42);
    let rng2 = TestRng::with_seed(42);

    let values1: Vec<u64> = (0..5).map(|_| rng1.gen()).collect();
    let values2: Vec<u64> = (0..5).map(|_| rng2.gen()).collect();

    println!("Seed: 0x{:016x}", rng1.seed());
    println!("RNG1 values: {:?}", values1);
    println!("RNG2 values: {:?}", values2);
    println!("Values match: {}", values1 == values2);
    println!();
}

async fn fill_problem(seed: u64) -> Result<Vec<Circle>> {
    let env = DeterministicTestEnv::with_seed(seed);
    let ledger = TestLedger::builder().build()?;
    let settings = ProblemSettings::default();
    let problem = ledger.deploy_circle_problem(
        env.rng.gen_u256(),
        settings.problem_config(),
        settings.max_circles,
        settings.attempts_per_tx,
    )?;
    insert_until_finished(&problem, settings.max_insert_transactions).await?;
    let snapshot = problem.problem_snapshot().await?;
    let state = ProblemState::from_value(settings.problem_config(), &snapshot)?;
    Ok(state.accepted_circles().to_vec())
}

/// Demo 2: a circle problem filled from a seeded environment
async fn demo_seeded_problem() -> Result<()> {
    println!("Demo 2: Seeded Circle Problem");
    println!("------------------------------");

    let first = fill_problem(12345).await?;
    for circle in &first {
        println!("  ({}, {}) r={}", circle.x, circle.y, circle.radius);
    }
    let second = fill_problem(12345).await?;
    println!("Same seed, same circles: {}", first == second);
    println!();
    Ok(())
}

/// Demo 3: Seed Replay (Reproduce Failures)
fn demo_seed_replay() {
    println!("Demo 3: Seed Replay (Reproduce Failures)");
    println!("-----------------------------------------");

    // From RANDAO_TEST_SEED or random
    let env = DeterministicTestEnv::new();
    println!(
        "Current seed: 0x{:016x} (check stderr for replay command)",
        env.seed()
    );

    println!("\nIf this run failed, call env.on_failure():");
    env.on_failure("deterministic_demo");
    println!();
}
