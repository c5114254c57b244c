//! Harness configuration: JSON file, serde defaults, validation.

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use randao_common::circle::ProblemConfig;
use randao_common::config::{defaults as problem_defaults, milli_ether, MAX_CIRCLES};
use randao_common::record::{IslandPlan, KeySource};

/// Default values for configuration
pub mod defaults {
    pub const ACCOUNT_COUNT: usize = 10;
    pub const ISLAND_COUNT: usize = 4;
    pub const RECORDS_PER_ISLAND: usize = 2;
    // 0.1 ETH per account
    pub const FUNDING_MILLI_ETHER: u64 = 100;
    // Upper bound of insertion transactions before giving up
    pub const MAX_INSERT_TRANSACTIONS: u64 = 256;
    pub const ARTIFACTS_PATH: &str = "artifacts/";

    // Campaigns of the reference run: (task, payment in milli-ether)
    pub const CAMPAIGNS: [(u64, u64); 3] = [(664, 80), (574, 180), (116, 101)];

    // Validation limits
    pub const MAX_ACCOUNT_COUNT: usize = 1000;
    pub const MAX_RECORDS_PER_ISLAND: usize = 1000;
}

/// Shape of the problem deployed by the formation scenario.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemSettings {
    #[serde(default = "default_min_x")]
    pub min_x: u64,
    #[serde(default = "default_max_x")]
    pub max_x: u64,
    #[serde(default = "default_min_y")]
    pub min_y: u64,
    #[serde(default = "default_max_y")]
    pub max_y: u64,
    #[serde(default = "default_min_radius")]
    pub min_radius: u64,
    #[serde(default = "default_max_radius")]
    pub max_radius: u64,

    #[serde(default = "default_max_circles")]
    pub max_circles: usize,

    /// Candidates tried by one insertion transaction
    #[serde(default = "default_attempts_per_tx")]
    pub attempts_per_tx: u64,

    #[serde(default = "default_max_insert_transactions")]
    pub max_insert_transactions: u64,

    /// Candidates tried when generating the local test circle
    #[serde(default = "default_test_circle_budget")]
    pub test_circle_budget: u64,
}

impl ProblemSettings {
    pub fn problem_config(&self) -> ProblemConfig {
        ProblemConfig {
            min_x: U256::from(self.min_x),
            max_x: U256::from(self.max_x),
            min_y: U256::from(self.min_y),
            max_y: U256::from(self.max_y),
            min_radius: U256::from(self.min_radius),
            max_radius: U256::from(self.max_radius),
        }
    }
}

impl Default for ProblemSettings {
    fn default() -> Self {
        Self {
            min_x: default_min_x(),
            max_x: default_max_x(),
            min_y: default_min_y(),
            max_y: default_max_y(),
            min_radius: default_min_radius(),
            max_radius: default_max_radius(),
            max_circles: default_max_circles(),
            attempts_per_tx: default_attempts_per_tx(),
            max_insert_transactions: default_max_insert_transactions(),
            test_circle_budget: default_test_circle_budget(),
        }
    }
}

/// Account, island and record counts for the records scenario.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordSettings {
    #[serde(default = "default_account_count")]
    pub account_count: usize,

    /// Islands in total, dealt round-robin over the accounts
    #[serde(default = "default_island_count")]
    pub island_count: usize,

    #[serde(default = "default_records_per_island")]
    pub records_per_island: usize,

    #[serde(default = "default_funding_milli_ether")]
    pub funding_milli_ether: u64,

    /// Use OS randomness for account keys instead of the run seed
    #[serde(default)]
    pub random_keys: bool,
}

impl RecordSettings {
    pub fn island_plan(&self) -> IslandPlan {
        IslandPlan::Total(self.island_count)
    }

    pub fn funding(&self) -> U256 {
        milli_ether(self.funding_milli_ether)
    }

    /// Key source for a run seeded with `seed`.
    pub fn key_source(&self, seed: u64) -> KeySource {
        if self.random_keys {
            KeySource::SecureRandom
        } else {
            KeySource::Deterministic { seed }
        }
    }
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            account_count: default_account_count(),
            island_count: default_island_count(),
            records_per_island: default_records_per_island(),
            funding_milli_ether: default_funding_milli_ether(),
            random_keys: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignSettings {
    pub task: u64,
    pub payment_milli_ether: u64,
}

impl CampaignSettings {
    pub fn payment(&self) -> U256 {
        milli_ether(self.payment_milli_ether)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Seed of the run; `RANDAO_TEST_SEED` or random when absent
    #[serde(default)]
    pub rng_seed: Option<u64>,

    #[serde(default)]
    pub problem: ProblemSettings,

    #[serde(default)]
    pub records: RecordSettings,

    #[serde(default = "default_campaigns")]
    pub campaigns: Vec<CampaignSettings>,

    /// Where failure artifacts are written
    #[serde(default = "default_artifacts_path")]
    pub artifacts_path: PathBuf,
}

// Default functions for serde
fn default_min_x() -> u64 {
    problem_defaults::MIN_X
}
fn default_max_x() -> u64 {
    problem_defaults::MAX_X
}
fn default_min_y() -> u64 {
    problem_defaults::MIN_Y
}
fn default_max_y() -> u64 {
    problem_defaults::MAX_Y
}
fn default_min_radius() -> u64 {
    problem_defaults::MIN_RADIUS
}
fn default_max_radius() -> u64 {
    problem_defaults::MAX_RADIUS
}
fn default_max_circles() -> usize {
    problem_defaults::MAX_CIRCLES
}
fn default_attempts_per_tx() -> u64 {
    problem_defaults::ATTEMPTS_PER_TX
}
fn default_max_insert_transactions() -> u64 {
    defaults::MAX_INSERT_TRANSACTIONS
}
fn default_test_circle_budget() -> u64 {
    problem_defaults::TEST_CIRCLE_BUDGET
}
fn default_account_count() -> usize {
    defaults::ACCOUNT_COUNT
}
fn default_island_count() -> usize {
    defaults::ISLAND_COUNT
}
fn default_records_per_island() -> usize {
    defaults::RECORDS_PER_ISLAND
}
fn default_funding_milli_ether() -> u64 {
    defaults::FUNDING_MILLI_ETHER
}
fn default_campaigns() -> Vec<CampaignSettings> {
    defaults::CAMPAIGNS
        .iter()
        .map(|(task, payment)| CampaignSettings {
            task: *task,
            payment_milli_ether: *payment,
        })
        .collect()
}
fn default_artifacts_path() -> PathBuf {
    PathBuf::from(defaults::ARTIFACTS_PATH)
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            problem: ProblemSettings::default(),
            records: RecordSettings::default(),
            campaigns: default_campaigns(),
            artifacts_path: default_artifacts_path(),
        }
    }
}

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("Invalid problem shape: {0}")]
    InvalidProblem(String),

    #[error("Invalid {field}: {value} - must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("Invalid campaign for task {task}: payment must be positive")]
    ZeroPayment { task: u64 },

    #[error("Island plan needs accounts: {islands} islands for 0 accounts")]
    IslandsWithoutAccounts { islands: usize },
}

fn check_range(
    field: &'static str,
    value: u64,
    min: u64,
    max: u64,
) -> Result<(), ConfigValidationError> {
    if value < min || value > max {
        return Err(ConfigValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl HarnessConfig {
    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write the default configuration as pretty JSON.
    pub fn generate_template(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&Self::default())
            .context("Failed to serialize default configuration")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config template {}", path.display()))?;
        info!("Configuration template written to {}", path.display());
        Ok(())
    }

    /// Check every setting, stopping at the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let problem = &self.problem;
        problem
            .problem_config()
            .validate()
            .map_err(|e| ConfigValidationError::InvalidProblem(e.to_string()))?;
        check_range("max_circles", problem.max_circles as u64, 1, MAX_CIRCLES as u64)?;
        check_range("attempts_per_tx", problem.attempts_per_tx, 1, u64::MAX)?;
        check_range(
            "max_insert_transactions",
            problem.max_insert_transactions,
            1,
            u64::MAX,
        )?;
        check_range("test_circle_budget", problem.test_circle_budget, 1, u64::MAX)?;

        let records = &self.records;
        check_range(
            "account_count",
            records.account_count as u64,
            0,
            defaults::MAX_ACCOUNT_COUNT as u64,
        )?;
        check_range(
            "records_per_island",
            records.records_per_island as u64,
            0,
            defaults::MAX_RECORDS_PER_ISLAND as u64,
        )?;
        if records.account_count == 0 && records.island_count > 0 {
            return Err(ConfigValidationError::IslandsWithoutAccounts {
                islands: records.island_count,
            });
        }

        if let Some(campaign) = self.campaigns.iter().find(|c| c.payment_milli_ether == 0) {
            return Err(ConfigValidationError::ZeroPayment {
                task: campaign.task,
            });
        }

        if records.records_per_island > 0 && records.funding_milli_ether == 0 {
            warn!("records will be submitted by unfunded accounts and revert");
        }
        Ok(())
    }

    /// `validate` as an `anyhow` error, for callers that only propagate.
    pub fn validated(self) -> Result<Self> {
        self.validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = HarnessConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.campaigns.len(), 3);
        assert_eq!(config.records.island_plan(), IslandPlan::Total(4));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: HarnessConfig =
            serde_json::from_str(r#"{ "rng_seed": 7, "problem": { "max_circles": 3 } }"#).unwrap();
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.problem.max_circles, 3);
        assert_eq!(config.problem.max_x, problem_defaults::MAX_X);
        assert_eq!(config.records, RecordSettings::default());
    }

    #[test]
    fn test_invalid_problem_rejected() {
        let mut config = HarnessConfig::default();
        config.problem.max_radius = 600;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidProblem(_))
        ));

        let mut config = HarnessConfig::default();
        config.problem.max_circles = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::OutOfRange { field: "max_circles", .. })
        ));
    }

    #[test]
    fn test_zero_payment_rejected() {
        let mut config = HarnessConfig::default();
        config.campaigns.push(CampaignSettings {
            task: 1,
            payment_milli_ether: 0,
        });
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroPayment { task: 1 })
        );
    }

    #[test]
    fn test_template_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.json");
        HarnessConfig::generate_template(&path).unwrap();
        let loaded = HarnessConfig::from_file(&path).unwrap();
        assert_eq!(loaded, HarnessConfig::default());
    }

    #[test]
    fn test_key_source_follows_seed() {
        let settings = RecordSettings::default();
        assert_eq!(settings.key_source(9), KeySource::Deterministic { seed: 9 });
        let random = RecordSettings {
            random_keys: true,
            ..RecordSettings::default()
        };
        assert_eq!(random.key_source(9), KeySource::SecureRandom);
    }
}
