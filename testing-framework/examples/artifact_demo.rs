// Example: Artifact Collection Demo
//
// Forces a problem formation run to fail, saves the failure artifact and
// replays its summary.

use anyhow::Result;
use randao_testing_framework::prelude::*;
use randao_testing_framework::utilities::{load_artifact, print_artifact_summary, validate_artifact};

#[tokio::main]
async fn main() -> Result<()> {
    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║            Artifact Collection System Demo                     ║");
    println!("╚════════════════════════════════════════════════════════════════╝\n");

    // Step 1: a run that cannot finish within its transaction limit
    println!("1. Configuring a run that stops after 2 insertion transactions...");
    let temp_dir = std::env::temp_dir().join("randao_artifacts");
    let mut config = HarnessConfig {
        rng_seed: Some(0xa3f5c8e1b2d94706),
        artifacts_path: temp_dir.clone(),
        ..Default::default()
    };
    config.problem.max_insert_transactions = 2;

    // Step 2: run it
    println!("2. Running problem formation...");
    let mut ctx = ScenarioContext::new(config)?;
    let report = execute(&mut ctx, ScenarioKind::ProblemFormation).await;
    println!(
        "   success: {}, error: {}\n",
        report.success,
        report.error.as_deref().unwrap_or("-")
    );

    // Step 3: save artifact
    println!("3. Saving artifact...");
    let artifact_path = ctx.save_artifact().await?;
    println!("   ✅ Artifact saved to: {}\n", artifact_path.display());

    // Step 4: load, display and validate
    println!("4. Loading and displaying artifact...\n");
    let loaded_artifact = load_artifact(&artifact_path).await?;
    print_artifact_summary(&loaded_artifact);
    validate_artifact(&loaded_artifact)?;
    println!("\n   ✅ Artifact is consistent");

    println!("\n5. Artifact file contents:");
    println!(
        "   File size: {} bytes",
        std::fs::metadata(&artifact_path)?.len()
    );
    println!("   Contains:");
    println!("     - Test metadata (name, seed, timestamp, failure reason)");
    println!("     - Harness configuration");
    println!("     - Problem snapshot ({} events)", loaded_artifact.events.len());
    println!("     - Logs ({} entries)", loaded_artifact.logs.len());

    println!("\n6. Cleanup:");
    std::fs::remove_file(&artifact_path)?;
    println!("   ✅ Artifact file removed\n");

    Ok(())
}
