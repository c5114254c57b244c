//! End-to-end scenarios against the in-process ledger
//!
//! - **campaigns**: islands and paid campaigns on the registry
//! - **problem_formation**: fill a circle problem, replay it locally and
//!   validate a fresh test circle
//! - **records_signature**: accounts, islands, funding, signed records and
//!   their verification on both sides
//!
//! ## Example
//!
//! ```rust,ignore
//! use randao_testing_framework::prelude::*;
//!
//! let mut ctx = ScenarioContext::new(HarnessConfig::default())?;
//! let report = execute(&mut ctx, ScenarioKind::ProblemFormation).await;
//! assert!(report.success);
//! ```

pub mod campaigns;
pub mod problem_formation;
pub mod records_signature;

pub use campaigns::{run_campaigns, CampaignsReport};
pub use problem_formation::{insert_until_finished, run_problem_formation, ProblemFormationReport};
pub use records_signature::{run_records_signature, RecordsSignatureReport};

use anyhow::{Context, Result};
use log::{error, info};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::HarnessConfig;
use crate::ledger::TestLedger;
use crate::orchestrator::DeterministicTestEnv;
use crate::utilities::ArtifactCollector;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum ScenarioKind {
    Campaigns,
    ProblemFormation,
    RecordsSignature,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::Campaigns,
        ScenarioKind::ProblemFormation,
        ScenarioKind::RecordsSignature,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::Campaigns => "campaigns",
            ScenarioKind::ProblemFormation => "problem_formation",
            ScenarioKind::RecordsSignature => "records_signature",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a scenario runs against. One context per scenario run, so
/// the artifact collector only holds that run's state.
pub struct ScenarioContext {
    pub ledger: TestLedger,
    pub env: DeterministicTestEnv,
    pub config: HarnessConfig,
    pub artifacts: ArtifactCollector,
}

impl ScenarioContext {
    /// Fresh ledger and environment for `config`.
    pub fn new(config: HarnessConfig) -> Result<Self> {
        let ledger = TestLedger::builder().build()?;
        let env = DeterministicTestEnv::from_option(config.rng_seed);
        Self::with_parts(config, ledger, env)
    }

    pub fn with_parts(
        config: HarnessConfig,
        ledger: TestLedger,
        env: DeterministicTestEnv,
    ) -> Result<Self> {
        let config = config.validated()?;
        let mut artifacts = ArtifactCollector::new("randao_harness");
        artifacts.set_rng_seed(env.seed());
        artifacts.set_config(config.clone());
        Ok(Self {
            ledger,
            env,
            config,
            artifacts,
        })
    }

    /// Write the collected artifact to the configured directory.
    pub async fn save_artifact(&mut self) -> Result<PathBuf> {
        self.artifacts.capture_events(self.ledger.events());
        let dir = self.config.artifacts_path.clone();
        self.artifacts
            .save(&dir)
            .await
            .with_context(|| format!("Failed to save artifact to {}", dir.display()))
    }
}

/// Outcome of one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub scenario_name: String,
    pub success: bool,
    pub duration_ms: u64,
    /// Scenario specific report, `null` on failure
    pub details: Value,
    pub error: Option<String>,
}

async fn dispatch(ctx: &mut ScenarioContext, kind: ScenarioKind) -> Result<Value> {
    let details = match kind {
        ScenarioKind::Campaigns => serde_json::to_value(run_campaigns(ctx).await?),
        ScenarioKind::ProblemFormation => serde_json::to_value(run_problem_formation(ctx).await?),
        ScenarioKind::RecordsSignature => serde_json::to_value(run_records_signature(ctx).await?),
    };
    details.context("Failed to serialize scenario report")
}

/// Run one scenario and turn its outcome into a report. On failure the
/// reason and the ledger events are recorded in `ctx.artifacts`.
pub async fn execute(ctx: &mut ScenarioContext, kind: ScenarioKind) -> ExecutionReport {
    info!("▶ Running scenario {} (seed 0x{:016x})", kind, ctx.env.seed());
    ctx.artifacts.set_test_name(kind.name());
    let start = Instant::now();
    let result = dispatch(ctx, kind).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(details) => {
            info!("✅ Scenario {} passed in {} ms", kind, duration_ms);
            ctx.artifacts
                .capture_log("INFO", format!("scenario {} passed", kind));
            ExecutionReport {
                scenario_name: kind.name().to_string(),
                success: true,
                duration_ms,
                details,
                error: None,
            }
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            error!("❌ Scenario {} failed: {}", kind, reason);
            ctx.env.on_failure(kind.name());
            ctx.artifacts.set_failure_reason(reason.clone());
            ctx.artifacts
                .capture_log("ERROR", format!("scenario {} failed: {}", kind, reason));
            ctx.artifacts.capture_events(ctx.ledger.events());
            ExecutionReport {
                scenario_name: kind.name().to_string(),
                success: false,
                duration_ms,
                details: Value::Null,
                error: Some(reason),
            }
        }
    }
}
