//! `use randao_testing_framework::prelude::*;` brings in what a scenario
//! test usually needs.

pub use crate::config::{CampaignSettings, HarnessConfig, ProblemSettings, RecordSettings};
pub use crate::invariants::{
    check_balance_conservation, check_island_uniqueness, check_problem_state,
    check_replay_equivalence, replay_problem,
};
pub use crate::ledger::{CircleProblemContract, RandaoContract, TestLedger, TestLedgerBuilder};
pub use crate::orchestrator::{DeterministicTestEnv, ReplayTarget, TestRng};
pub use crate::scenarios::{execute, ExecutionReport, ScenarioContext, ScenarioKind};
pub use crate::utilities::{ArtifactCollector, TestArtifact};

pub use randao_common::circle::{Circle, ProblemConfig, ProblemState};
pub use randao_common::crypto::Address;
pub use randao_common::ledger::{CircleProblemLedger, FundingLedger, RandaoLedger};
pub use randao_common::record::AccountInventory;

pub use primitive_types::U256;
