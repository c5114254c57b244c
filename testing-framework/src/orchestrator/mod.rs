// File: testing-framework/src/orchestrator/mod.rs
//
// Orchestrator Module
//
// Deterministic environment shared by every scenario: one seeded RNG whose
// seed is printed on failure so the exact run can be replayed.

/// Deterministic random number generation for reproducible tests
pub mod rng;

pub use rng::{parse_seed, TestRng, SEED_ENV_VAR};

/// Complete deterministic test environment
///
/// All randomness of a run (deploy seeds, account key seed, record data)
/// comes from `rng`, so every run with the same seed produces the same
/// ledger history.
///
/// # Example
///
/// ```rust
/// use randao_testing_framework::orchestrator::DeterministicTestEnv;
///
/// let env = DeterministicTestEnv::with_seed(0xa3f5c8e1b2d94706);
/// let deploy_seed = env.rng.gen_u256();
/// assert!(!deploy_seed.is_zero());
/// ```
pub struct DeterministicTestEnv {
    /// Seeded RNG for reproducible randomness
    pub rng: TestRng,
    replay_target: ReplayTarget,
}

/// How a failed run is replayed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReplayTarget {
    /// `cargo test <name>` with the seed pinned by `RANDAO_TEST_SEED`
    #[default]
    CargoTest,
    /// `randao-harness --seed <seed> --scenario <name>`
    Harness,
}

impl DeterministicTestEnv {
    /// Seeded from `RANDAO_TEST_SEED` if set, randomly otherwise (logged).
    pub fn new() -> Self {
        Self {
            rng: TestRng::new_from_env_or_random(),
            replay_target: ReplayTarget::default(),
        }
    }

    /// Create environment with a specific seed (for debugging)
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: TestRng::with_seed(seed),
            replay_target: ReplayTarget::default(),
        }
    }

    /// Explicit seed when given, environment or random otherwise.
    pub fn from_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }

    pub fn with_replay_target(mut self, target: ReplayTarget) -> Self {
        self.replay_target = target;
        self
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Shell command that replays the run named `name`.
    pub fn replay_command(&self, name: &str) -> String {
        match self.replay_target {
            ReplayTarget::CargoTest => {
                format!("{}=0x{:016x} cargo test {}", SEED_ENV_VAR, self.seed(), name)
            }
            ReplayTarget::Harness => {
                format!("randao-harness --seed 0x{:016x} --scenario {}", self.seed(), name)
            }
        }
    }

    /// Print failure message with replay instructions
    pub fn on_failure(&self, name: &str) {
        eprintln!("❌ Test failed! Replay with:");
        eprintln!("   {}", self.replay_command(name));
    }
}

impl Default for DeterministicTestEnv {
    fn default() -> Self {
        Self::new()
    }
}
