//! Collaborator surface of the external ledger.
//!
//! The core never talks to a network directly. Everything it needs from
//! the ledger goes through these traits, so the same orchestration runs
//! against the in-process ledger of the testing framework or a real node
//! adapter.

use anyhow::Result;
use async_trait::async_trait;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::{Address, Hash};
use crate::record::{IslandId, Record};

/// Confirmation of a mined transaction.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: Hash,
    pub block_number: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    IslandRegistered {
        island_id: IslandId,
        owner: Address,
    },
    NewCampaign {
        campaign_id: u64,
        task: U256,
        payment: U256,
        creator: Address,
    },
    RecordInserted {
        island_id: IslandId,
        signer: Address,
        sequence: u64,
        digest: Hash,
    },
    AttemptInsertingCircle {
        is_finished: bool,
        circle_count: u64,
    },
}

impl LedgerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LedgerEvent::IslandRegistered { .. } => EventKind::IslandRegistered,
            LedgerEvent::NewCampaign { .. } => EventKind::NewCampaign,
            LedgerEvent::RecordInserted { .. } => EventKind::RecordInserted,
            LedgerEvent::AttemptInsertingCircle { .. } => EventKind::AttemptInsertingCircle,
        }
    }
}

/// Event filter, the equivalent of `contract.filters.<Event>`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    IslandRegistered,
    NewCampaign,
    RecordInserted,
    AttemptInsertingCircle,
}

/// An event together with where it was emitted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EmittedEvent {
    pub contract: Address,
    pub block_number: u64,
    pub tx_hash: Hash,
    pub event: LedgerEvent,
}

/// Result of one authoritative insertion transaction, read from its
/// `AttemptInsertingCircle` event.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertAttempt {
    pub receipt: TxReceipt,
    pub is_finished: bool,
    pub circle_count: u64,
}

/// Circle problem contract.
///
/// # Errors
///
/// Every method returns an error when the call cannot be performed or the
/// contract reverts. Retrying transport failures is up to the implementor.
#[async_trait]
pub trait CircleProblemLedger: Send + Sync {
    /// Contract address
    fn address(&self) -> Address;

    /// Raw problem snapshot as reported by the contract. Parsed and
    /// validated with `ProblemState::from_value`.
    async fn problem_snapshot(&self) -> Result<Value>;

    async fn maximum_circle_count(&self) -> Result<u64>;

    /// Send one insertion transaction and wait for it to be mined.
    async fn submit_insert_attempt(&self) -> Result<InsertAttempt>;

    /// Authoritative acceptance check of one circle.
    async fn validate_solution(&self, x: U256, y: U256, radius: U256) -> Result<bool>;

    /// Events of `kind` emitted by this contract in `[from_block, to_block]`.
    async fn query_events(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EmittedEvent>>;
}

/// FREE_RANDAO registry contract.
#[async_trait]
pub trait RandaoLedger: Send + Sync {
    fn address(&self) -> Address;

    /// Register `island_id` as owned by `owner`. Reverts if already registered.
    async fn register_island(&self, island_id: IslandId, owner: Address) -> Result<TxReceipt>;

    /// Current owner, `None` when not registered.
    async fn island_owner(&self, island_id: IslandId) -> Result<Option<Address>>;

    /// Create a paid campaign for `task`, paid by the connected signer.
    async fn create_campaign(&self, task: U256, payment: U256) -> Result<TxReceipt>;

    /// Submit a signed record, sent by its signer.
    async fn submit_record(&self, record: &Record) -> Result<TxReceipt>;

    /// The contract's own signature check.
    async fn verify_record_signature(&self, record: &Record) -> Result<bool>;

    async fn query_events(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EmittedEvent>>;
}

/// Value transfers from the funded signer.
#[async_trait]
pub trait FundingLedger: Send + Sync {
    /// Address of the funded signer
    fn funder(&self) -> Address;

    async fn transfer(&self, to: Address, amount: U256) -> Result<TxReceipt>;

    async fn balance(&self, address: Address) -> Result<U256>;
}
