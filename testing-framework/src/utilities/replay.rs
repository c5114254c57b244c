// File: testing-framework/src/utilities/replay.rs
//
// Artifact Replay Utilities
//
// Loading, summarising and checking saved failure artifacts.

use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

use randao_common::circle::ProblemState;

use super::artifacts::{ArtifactCollector, TestArtifact};
use crate::invariants::{check_island_uniqueness, check_problem_state};
use crate::orchestrator::SEED_ENV_VAR;

/// Load artifact from disk
pub async fn load_artifact(filepath: impl AsRef<Path>) -> Result<TestArtifact> {
    ArtifactCollector::load(filepath).await
}

fn row(label: &str, value: impl std::fmt::Display) {
    println!("║ {:14} {:47} ║", label, value.to_string());
}

/// Print artifact summary to stdout
///
/// Displays key information from the artifact in a human-readable format.
pub fn print_artifact_summary(artifact: &TestArtifact) {
    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║              TEST FAILURE ARTIFACT SUMMARY                     ║");
    println!("╠════════════════════════════════════════════════════════════════╣");
    row("Test Name:", &artifact.metadata.test_name);
    row("Timestamp:", &artifact.metadata.timestamp);
    row("Duration:", format!("{} ms", artifact.metadata.duration_ms));
    match artifact.metadata.rng_seed {
        Some(seed) => row("RNG Seed:", format!("0x{:016x}", seed)),
        None => row("RNG Seed:", "N/A"),
    }

    if let Some(ref reason) = artifact.metadata.failure_reason {
        println!("╠════════════════════════════════════════════════════════════════╣");
        println!("║ FAILURE REASON:                                                ║");
        for line in textwrap::wrap(reason, 62) {
            println!("║ {:62} ║", line);
        }
    }

    if let Some(ref problem) = artifact.problem {
        println!("╠════════════════════════════════════════════════════════════════╣");
        println!("║ CIRCLE PROBLEM:                                                ║");
        row("Contract:", problem.contract);
        row("Deploy Seed:", format!("{:#x}", problem.deploy_seed));
        row("Insert Txs:", problem.insert_transactions);
        let circles = artifact
            .config
            .as_ref()
            .zip(problem.snapshot.as_ref())
            .and_then(|(config, snapshot)| {
                ProblemState::from_value(config.problem.problem_config(), snapshot).ok()
            });
        match circles {
            Some(state) => row(
                "Circles:",
                format!(
                    "{}/{} ({:?})",
                    state.circle_count(),
                    state.max_circles(),
                    state.status()
                ),
            ),
            None => row("Circles:", "no valid snapshot"),
        }
    }

    if let Some(ref records) = artifact.records {
        println!("╠════════════════════════════════════════════════════════════════╣");
        println!("║ RECORDS:                                                       ║");
        row("Contract:", records.contract);
        row("Accounts:", records.accounts.len());
        row("Islands:", records.islands.len());
        row("Records:", records.records.len());
        if let Some(local) = records.local {
            row("Local:", format!("{}/{} valid", local.valid, local.total));
        }
        if let Some(remote) = records.remote {
            row("Ledger:", format!("{}/{} valid", remote.valid, remote.total));
        }
    }

    println!("╠════════════════════════════════════════════════════════════════╣");
    row("Events:", format!("{} recorded", artifact.events.len()));
    row("Log Entries:", format!("{} captured", artifact.logs.len()));

    if !artifact.logs.is_empty() {
        println!("╠════════════════════════════════════════════════════════════════╣");
        println!("║ RECENT LOGS (last 5):                                          ║");
        for log in artifact.logs.iter().rev().take(5).rev() {
            let msg: String = if log.message.chars().count() > 52 {
                let head: String = log.message.chars().take(49).collect();
                format!("{}...", head)
            } else {
                log.message.clone()
            };
            println!("║ [{:5}] {:54} ║", log.level, msg);
        }
    }

    println!("╠════════════════════════════════════════════════════════════════╣");
    println!("║ REPLAY COMMAND:                                                ║");
    for line in textwrap::wrap(&get_replay_command(artifact), 62) {
        println!("║ {:62} ║", line);
    }
    println!("╚════════════════════════════════════════════════════════════════╝");
}

/// Extract replay command from artifact
///
/// Returns the shell command needed to replay the test with the same seed.
pub fn get_replay_command(artifact: &TestArtifact) -> String {
    if let Some(seed) = artifact.metadata.rng_seed {
        format!(
            "{}=0x{:016x} cargo test {}",
            SEED_ENV_VAR, seed, artifact.metadata.test_name
        )
    } else {
        format!("cargo test {}", artifact.metadata.test_name)
    }
}

/// Validate artifact integrity
///
/// Checks the metadata, that a captured problem snapshot is a valid
/// problem state for the captured configuration, and that the record
/// inventory is self-consistent.
pub fn validate_artifact(artifact: &TestArtifact) -> Result<()> {
    if artifact.metadata.test_name.is_empty() {
        bail!("Artifact has empty test name");
    }
    if artifact.metadata.timestamp.is_empty() {
        bail!("Artifact has empty timestamp");
    }

    if let Some(snapshot) = artifact.problem.as_ref().and_then(|p| p.snapshot.as_ref()) {
        let Some(ref config) = artifact.config else {
            bail!("Artifact has a problem snapshot but no configuration");
        };
        let state = ProblemState::from_value(config.problem.problem_config(), snapshot)
            .context("Artifact problem snapshot is invalid")?;
        check_problem_state(&state)?;
    }

    if let Some(ref records) = artifact.records {
        check_island_uniqueness(&records.islands)?;
        let accounts: BTreeSet<_> = records.accounts.iter().collect();
        if let Some(island) = records.islands.iter().find(|i| !accounts.contains(&i.owner)) {
            bail!(
                "Island {} owned by unknown account {}",
                island.island_id,
                island.owner
            );
        }
        if let Some(record) = records.records.iter().find(|r| !accounts.contains(&r.signer)) {
            bail!("Record signed by unknown account {}", record.signer);
        }
        for summary in [records.local, records.remote].into_iter().flatten() {
            if summary.valid + summary.invalid != summary.total {
                bail!(
                    "Inconsistent verification summary: {} + {} != {}",
                    summary.valid,
                    summary.invalid,
                    summary.total
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::utilities::artifacts::{ProblemArtifact, RecordsArtifact};
    use primitive_types::U256;
    use randao_common::circle::{Circle, ProblemSnapshot};
    use randao_common::crypto::Address;
    use randao_common::record::{Island, VerificationSummary};

    fn collector_with_problem(circles: Vec<Circle>) -> ArtifactCollector {
        let mut collector = ArtifactCollector::new("problem_formation");
        collector.set_rng_seed(0x1234);
        collector.set_config(HarnessConfig::default());
        let snapshot = ProblemSnapshot {
            seed: U256::from(5u64),
            circles,
            max_circles: U256::from(8u64),
            is_finished: false,
        };
        collector.set_problem(ProblemArtifact {
            contract: Address::new([1; 20]),
            deploy_seed: U256::from(5u64),
            insert_transactions: 1,
            snapshot: Some(snapshot.to_value()),
        });
        collector
    }

    #[test]
    fn test_replay_command() {
        let mut collector = collector_with_problem(Vec::new());
        let artifact = collector.snapshot();
        assert_eq!(
            get_replay_command(&artifact),
            "RANDAO_TEST_SEED=0x0000000000001234 cargo test problem_formation"
        );
    }

    #[test]
    fn test_validate_accepts_consistent_artifact() {
        let mut collector = collector_with_problem(vec![Circle::from_u64(100, 100, 50)]);
        collector.set_failure_reason("replay diverged at circle #3".to_string());
        let artifact = collector.snapshot();
        assert!(validate_artifact(&artifact).is_ok());
        print_artifact_summary(&artifact);
    }

    #[test]
    fn test_validate_rejects_overlapping_snapshot() {
        let mut collector = collector_with_problem(vec![
            Circle::from_u64(100, 100, 50),
            Circle::from_u64(120, 100, 50),
        ]);
        assert!(validate_artifact(&collector.snapshot()).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_island_owner() {
        let mut collector = ArtifactCollector::new("records_signature");
        collector.set_records(RecordsArtifact {
            contract: Address::new([2; 20]),
            accounts: vec![Address::new([3; 20])],
            islands: vec![Island {
                island_id: 1,
                owner: Address::new([4; 20]),
            }],
            records: Vec::new(),
            local: Some(VerificationSummary::default()),
            remote: None,
        });
        assert!(validate_artifact(&collector.snapshot()).is_err());
    }

    #[tokio::test]
    async fn test_load_saved_artifact() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut collector = collector_with_problem(vec![Circle::from_u64(500, 500, 30)]);
        let path = collector.save(dir.path()).await?;
        let artifact = load_artifact(&path).await?;
        validate_artifact(&artifact)?;
        assert_eq!(artifact.metadata.rng_seed, Some(0x1234));
        Ok(())
    }
}
