use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;

use randao_testing_framework::config::HarnessConfig;
use randao_testing_framework::ledger::TestLedger;
use randao_testing_framework::orchestrator::{parse_seed, DeterministicTestEnv, ReplayTarget};
use randao_testing_framework::scenarios::{execute, ExecutionReport, ScenarioContext, ScenarioKind};
use randao_testing_framework::utilities::{load_artifact, print_artifact_summary, validate_artifact};

/// Same forms as `RANDAO_TEST_SEED`: decimal or `0x` hex.
fn seed_arg(text: &str) -> Result<u64, String> {
    parse_seed(text).ok_or_else(|| format!("`{}` is not a decimal or 0x-prefixed hex u64", text))
}

/// FREE_RANDAO harness - drive the ledger flows against an in-process chain
#[derive(Parser, Debug)]
#[command(name = "randao-harness")]
#[command(about = "Run FREE_RANDAO scenarios against an in-process ledger")]
struct Cli {
    /// JSON configuration file
    #[clap(long)]
    config: Option<PathBuf>,

    /// RNG seed (decimal or 0x hex), overrides the configuration and RANDAO_TEST_SEED
    #[clap(long, value_parser = seed_arg)]
    seed: Option<u64>,

    /// Scenario to run, repeatable; all of them when absent
    #[clap(long, value_enum)]
    scenario: Vec<ScenarioKind>,

    /// Write the default configuration to this path and exit
    #[clap(long)]
    generate_config: Option<PathBuf>,

    /// Print and validate a saved failure artifact instead of running
    #[clap(long)]
    replay: Option<PathBuf>,

    /// Directory for failure artifacts, overrides the configuration
    #[clap(long)]
    artifacts_dir: Option<PathBuf>,
}

async fn replay(path: PathBuf) -> Result<bool> {
    let artifact = load_artifact(&path).await?;
    print_artifact_summary(&artifact);
    match validate_artifact(&artifact) {
        Ok(()) => {
            info!("Artifact {} is consistent", path.display());
            Ok(true)
        }
        Err(e) => {
            error!("Artifact {} is inconsistent: {:#}", path.display(), e);
            Ok(false)
        }
    }
}

async fn run_scenario(config: HarnessConfig, kind: ScenarioKind) -> Result<ExecutionReport> {
    let env = DeterministicTestEnv::from_option(config.rng_seed)
        .with_replay_target(ReplayTarget::Harness);
    let mut ctx = ScenarioContext::with_parts(config, TestLedger::builder().build()?, env)?;
    let report = execute(&mut ctx, kind).await;
    if !report.success {
        match ctx.save_artifact().await {
            Ok(path) => {
                warn!("Failure artifact saved to {}", path.display());
                warn!("Replay with: {}", ctx.env.replay_command(kind.name()));
            }
            Err(e) => error!("{:#}", e),
        }
    }
    Ok(report)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    info!("randao harness {}", randao_common::config::VERSION);

    if let Some(path) = cli.generate_config {
        return HarnessConfig::generate_template(path);
    }

    if let Some(path) = cli.replay {
        if !replay(path).await? {
            std::process::exit(1);
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => HarnessConfig::from_file(path)?,
        None => HarnessConfig::default(),
    };
    if cli.seed.is_some() {
        config.rng_seed = cli.seed;
    }
    if let Some(dir) = cli.artifacts_dir {
        config.artifacts_path = dir;
    }
    let mut config = config.validated()?;

    // One seed for the whole run so every scenario replays together
    let seed = match config.rng_seed {
        Some(seed) => seed,
        None => DeterministicTestEnv::new().seed(),
    };
    config.rng_seed = Some(seed);

    let scenarios = if cli.scenario.is_empty() {
        ScenarioKind::ALL.to_vec()
    } else {
        cli.scenario
    };

    let mut reports = Vec::with_capacity(scenarios.len());
    for kind in scenarios {
        reports.push(run_scenario(config.clone(), kind).await?);
    }

    let json = serde_json::to_string_pretty(&reports).context("Failed to serialize reports")?;
    println!("{}", json);

    let failed = reports.iter().filter(|r| !r.success).count();
    if failed > 0 {
        error!("{} of {} scenarios failed (seed 0x{:016x})", failed, reports.len(), seed);
        std::process::exit(1);
    }
    info!("All {} scenarios passed", reports.len());
    Ok(())
}
