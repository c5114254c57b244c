// File: testing-framework/src/utilities/artifacts.rs
//
// Failure Artifact Collection System
//
// Collects what is needed to reproduce a failed run: the seed, the
// configuration, the problem snapshot, the account/record summary and the
// ledger's event log.

use anyhow::{Context, Result};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use randao_common::crypto::Address;
use randao_common::ledger::EmittedEvent;
use randao_common::record::{Island, Record, VerificationSummary};

use crate::config::HarnessConfig;

/// Circle problem state at the time of capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemArtifact {
    /// Contract address
    pub contract: Address,
    /// Seed the problem was deployed with
    pub deploy_seed: U256,
    /// Insertion transactions sent so far
    pub insert_transactions: u64,
    /// Canonical snapshot (`ProblemSnapshot::to_value`), if one was read
    pub snapshot: Option<Value>,
}

/// Accounts, islands and records of a records run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsArtifact {
    /// Registry contract address
    pub contract: Address,
    /// Account addresses
    pub accounts: Vec<Address>,
    /// Island assignments
    pub islands: Vec<Island>,
    /// Records kept by the inventory
    pub records: Vec<Record>,
    /// Local verification outcome, if reached
    pub local: Option<VerificationSummary>,
    /// Ledger verification outcome, if reached
    pub remote: Option<VerificationSummary>,
}

/// Complete test failure artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestArtifact {
    /// Test metadata
    pub metadata: TestMetadata,
    /// Harness configuration of the run
    pub config: Option<HarnessConfig>,
    /// Circle problem state (problem formation runs)
    pub problem: Option<ProblemArtifact>,
    /// Record inventory (records runs)
    pub records: Option<RecordsArtifact>,
    /// Ledger events
    pub events: Vec<EmittedEvent>,
    /// Captured logs
    pub logs: Vec<LogEntry>,
}

/// Test metadata for reproduction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMetadata {
    /// Test name
    pub test_name: String,
    /// RNG seed used (if available)
    pub rng_seed: Option<u64>,
    /// Timestamp when test failed
    pub timestamp: String,
    /// Test duration (milliseconds)
    pub duration_ms: u64,
    /// Failure reason (if available)
    pub failure_reason: Option<String>,
}

/// Log entry captured during test execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub level: String,
    /// Log message
    pub message: String,
    /// Timestamp
    pub timestamp: String,
}

/// Artifact collector for capturing test failure state
///
/// # Examples
///
/// ```rust,ignore
/// use randao_testing_framework::utilities::artifacts::ArtifactCollector;
///
/// let mut collector = ArtifactCollector::new("records_signature");
/// collector.set_rng_seed(env.seed());
///
/// if let Err(e) = run(&mut collector).await {
///     collector.set_failure_reason(format!("{:#}", e));
///     collector.capture_events(ledger.events());
///     collector.save("./artifacts/").await?;
/// }
/// ```
pub struct ArtifactCollector {
    metadata: TestMetadata,
    config: Option<HarnessConfig>,
    problem: Option<ProblemArtifact>,
    records: Option<RecordsArtifact>,
    events: Vec<EmittedEvent>,
    logs: Vec<LogEntry>,
    start_time: std::time::Instant,
}

impl ArtifactCollector {
    /// Create a new artifact collector for a test
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            metadata: TestMetadata {
                test_name: test_name.into(),
                rng_seed: None,
                timestamp: chrono::Utc::now().to_rfc3339(),
                duration_ms: 0,
                failure_reason: None,
            },
            config: None,
            problem: None,
            records: None,
            events: Vec::new(),
            logs: Vec::new(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn test_name(&self) -> &str {
        &self.metadata.test_name
    }

    /// Rename the artifact, e.g. after the scenario that is about to run
    pub fn set_test_name(&mut self, test_name: impl Into<String>) {
        self.metadata.test_name = test_name.into();
    }

    /// Set the RNG seed used in the test
    pub fn set_rng_seed(&mut self, seed: u64) {
        self.metadata.rng_seed = Some(seed);
    }

    /// Set the failure reason
    pub fn set_failure_reason(&mut self, reason: String) {
        self.metadata.failure_reason = Some(reason);
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.metadata.failure_reason.as_deref()
    }

    pub fn set_config(&mut self, config: HarnessConfig) {
        self.config = Some(config);
    }

    /// Replace the captured problem state
    pub fn set_problem(&mut self, problem: ProblemArtifact) {
        self.problem = Some(problem);
    }

    /// Mutable access to the problem state, to update it in place
    pub fn problem_mut(&mut self) -> Option<&mut ProblemArtifact> {
        self.problem.as_mut()
    }

    /// Replace the captured record inventory
    pub fn set_records(&mut self, records: RecordsArtifact) {
        self.records = Some(records);
    }

    pub fn records_mut(&mut self) -> Option<&mut RecordsArtifact> {
        self.records.as_mut()
    }

    /// Replace the captured event log
    pub fn capture_events(&mut self, events: Vec<EmittedEvent>) {
        self.events = events;
    }

    /// Capture a log entry
    pub fn capture_log(&mut self, level: impl Into<String>, message: impl Into<String>) {
        self.logs.push(LogEntry {
            level: level.into(),
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }

    /// Current content as an artifact, duration updated
    pub fn snapshot(&mut self) -> TestArtifact {
        self.metadata.duration_ms = self.start_time.elapsed().as_millis() as u64;
        TestArtifact {
            metadata: self.metadata.clone(),
            config: self.config.clone(),
            problem: self.problem.clone(),
            records: self.records.clone(),
            events: self.events.clone(),
            logs: self.logs.clone(),
        }
    }

    /// Save artifact to disk
    ///
    /// Creates a JSON file with all collected data. The filename includes
    /// the test name and timestamp for uniqueness.
    ///
    /// # Returns
    ///
    /// Path to the saved artifact file
    pub async fn save(&mut self, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
        let artifact = self.snapshot();

        // Create output directory
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)
            .await
            .context("Failed to create artifact directory")?;

        // <test>_<seed>_<timestamp>[_<n>].json, never overwriting
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let stem = match self.metadata.rng_seed {
            Some(seed) => format!("{}_{:016x}_{}", self.metadata.test_name, seed, timestamp),
            None => format!("{}_{}", self.metadata.test_name, timestamp),
        };
        let mut filepath = output_dir.join(format!("{}.json", stem));
        let mut counter = 1u32;
        while fs::try_exists(&filepath)
            .await
            .context("Failed to check artifact path")?
        {
            filepath = output_dir.join(format!("{}_{}.json", stem, counter));
            counter += 1;
        }

        let json =
            serde_json::to_string_pretty(&artifact).context("Failed to serialize artifact")?;

        let mut file = fs::File::create(&filepath)
            .await
            .context("Failed to create artifact file")?;
        file.write_all(json.as_bytes())
            .await
            .context("Failed to write artifact data")?;
        file.flush()
            .await
            .context("Failed to flush artifact file")?;

        Ok(filepath)
    }

    /// Load artifact from disk
    pub async fn load(filepath: impl AsRef<Path>) -> Result<TestArtifact> {
        let filepath = filepath.as_ref();
        let content = fs::read_to_string(filepath)
            .await
            .context("Failed to read artifact file")?;

        let artifact: TestArtifact =
            serde_json::from_str(&content).context("Failed to parse artifact JSON")?;

        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use randao_common::circle::{Circle, ProblemSnapshot};
    use randao_common::crypto::Hash;
    use randao_common::ledger::LedgerEvent;

    fn problem() -> ProblemArtifact {
        let snapshot = ProblemSnapshot {
            seed: U256::from(9u64),
            circles: vec![Circle::from_u64(100, 100, 20)],
            max_circles: U256::from(4u64),
            is_finished: false,
        };
        ProblemArtifact {
            contract: Address::new([3; 20]),
            deploy_seed: U256::from(1u64),
            insert_transactions: 2,
            snapshot: Some(snapshot.to_value()),
        }
    }

    #[test]
    fn test_artifact_collector_creation() {
        let collector = ArtifactCollector::new("test_example");
        assert_eq!(collector.test_name(), "test_example");
        assert!(collector.metadata.rng_seed.is_none());
        assert!(collector.failure_reason().is_none());
    }

    #[test]
    fn test_set_failure_reason() {
        let mut collector = ArtifactCollector::new("test_example");
        collector.set_failure_reason("Test failed!".to_string());
        assert_eq!(collector.failure_reason(), Some("Test failed!"));
    }

    #[test]
    fn test_problem_update_in_place() {
        let mut collector = ArtifactCollector::new("test_example");
        assert!(collector.problem_mut().is_none());
        collector.set_problem(problem());
        if let Some(problem) = collector.problem_mut() {
            problem.insert_transactions += 1;
        }
        assert_eq!(collector.snapshot().problem.unwrap().insert_transactions, 3);
    }

    #[test]
    fn test_capture_log() {
        let mut collector = ArtifactCollector::new("test_example");
        collector.capture_log("ERROR", "Test error message");
        collector.capture_log("INFO", "Test info message");

        assert_eq!(collector.logs.len(), 2);
        assert_eq!(collector.logs[0].level, "ERROR");
        assert_eq!(collector.logs[1].level, "INFO");
    }

    #[tokio::test]
    async fn test_saves_in_same_second_do_not_overwrite() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut collector = ArtifactCollector::new("problem_formation");
        collector.set_rng_seed(0xbad);

        let first = collector.save(temp_dir.path()).await?;
        collector.set_failure_reason("second failure".to_string());
        let second = collector.save(temp_dir.path()).await?;
        assert_ne!(first, second);
        assert!(first
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("problem_formation_0000000000000bad_")));

        assert!(ArtifactCollector::load(&first).await?.metadata.failure_reason.is_none());
        assert_eq!(
            ArtifactCollector::load(&second).await?.metadata.failure_reason.as_deref(),
            Some("second failure")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_save_and_load_artifact() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut collector = ArtifactCollector::new("test_save_load");
        collector.set_rng_seed(0xdeadbeef);
        collector.set_failure_reason("Test failure".to_string());
        collector.set_config(HarnessConfig::default());
        collector.set_problem(problem());
        collector.capture_events(vec![EmittedEvent {
            contract: Address::new([3; 20]),
            block_number: 4,
            tx_hash: Hash::new([1; 32]),
            event: LedgerEvent::AttemptInsertingCircle {
                is_finished: false,
                circle_count: 1,
            },
        }]);
        collector.capture_log("ERROR", "Test log");

        let filepath = collector.save(temp_dir.path()).await?;
        assert!(filepath.exists());

        let loaded = ArtifactCollector::load(&filepath).await?;
        assert_eq!(loaded.metadata.test_name, "test_save_load");
        assert_eq!(loaded.metadata.rng_seed, Some(0xdeadbeef));
        assert_eq!(
            loaded.metadata.failure_reason,
            Some("Test failure".to_string())
        );
        assert_eq!(loaded.config, Some(HarnessConfig::default()));
        assert_eq!(loaded.problem.unwrap().deploy_seed, U256::from(1u64));
        assert_eq!(loaded.events.len(), 1);
        assert_eq!(loaded.logs.len(), 1);
        Ok(())
    }
}
