//! In-process ledger
//!
//! Auto-mining, single-process stand-in for the chain the orchestration
//! talks to. Every transaction is mined in its own block, events are kept
//! per contract address, and value transfers move real balances.
//!
//! ## Example
//!
//! ```rust,ignore
//! use randao_testing_framework::prelude::*;
//!
//! let ledger = TestLedger::builder().build()?;
//! let problem = ledger.deploy_circle_problem(seed, ProblemConfig::default(), 8, 16)?;
//! let attempt = problem.submit_insert_attempt().await?;
//! ```

mod builder;
mod chain;
mod circle_problem;
mod free_randao;

pub use builder::{TestLedgerBuilder, DEFAULT_FUNDER};
pub use chain::ChainState;
pub use circle_problem::CircleProblemContract;
pub use free_randao::{Campaign, RandaoContract};

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use primitive_types::U256;
use std::sync::Arc;

use randao_common::circle::ProblemConfig;
use randao_common::crypto::Address;
use randao_common::ledger::{EmittedEvent, FundingLedger, TxReceipt};

/// Handle to an in-process chain. Clones share the same chain.
#[derive(Clone)]
pub struct TestLedger {
    chain: Arc<Mutex<ChainState>>,
    funder: Address,
}

impl TestLedger {
    pub(crate) fn new(chain: ChainState, funder: Address) -> Self {
        Self {
            chain: Arc::new(Mutex::new(chain)),
            funder,
        }
    }

    pub fn builder() -> TestLedgerBuilder {
        TestLedgerBuilder::new()
    }

    pub fn block_number(&self) -> u64 {
        self.chain.lock().block_number()
    }

    pub fn nonce(&self, address: &Address) -> u64 {
        self.chain.lock().nonce(address)
    }

    /// Sum of every balance, contracts included.
    pub fn total_supply(&self) -> U256 {
        self.chain.lock().total_supply()
    }

    /// Every event mined so far, in order.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.chain.lock().all_events().to_vec()
    }

    /// Deploy a circle problem from the funder account.
    pub fn deploy_circle_problem(
        &self,
        seed: U256,
        config: ProblemConfig,
        max_circles: usize,
        attempts_per_tx: u64,
    ) -> Result<CircleProblemContract> {
        CircleProblemContract::deploy(
            self.chain.clone(),
            self.funder,
            seed,
            config,
            max_circles,
            attempts_per_tx,
        )
    }

    /// Deploy a FREE_RANDAO registry from the funder account.
    pub fn deploy_randao(&self) -> RandaoContract {
        RandaoContract::deploy(self.chain.clone(), self.funder)
    }
}

#[async_trait]
impl FundingLedger for TestLedger {
    fn funder(&self) -> Address {
        self.funder
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<TxReceipt> {
        let mut chain = self.chain.lock();
        chain.move_value(&self.funder, &to, amount)?;
        let receipt = chain.commit(self.funder, Vec::new());
        debug!("transferred {} wei to {} in block {}", amount, to, receipt.block_number);
        Ok(receipt)
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        Ok(self.chain.lock().balance(&address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use randao_common::ledger::RandaoLedger;

    #[tokio::test]
    async fn test_transfer_moves_balance() {
        let ledger = TestLedger::builder()
            .with_funder_balance(U256::from(1_000u64))
            .build()
            .unwrap();
        let to = Address::new([7; 20]);
        let supply = ledger.total_supply();

        let receipt = ledger.transfer(to, U256::from(250u64)).await.unwrap();
        assert_eq!(receipt.block_number, 1);
        assert_eq!(ledger.balance(to).await.unwrap(), U256::from(250u64));
        assert_eq!(
            ledger.balance(ledger.funder()).await.unwrap(),
            U256::from(750u64)
        );
        assert_eq!(ledger.total_supply(), supply);

        assert!(ledger.transfer(to, U256::from(751u64)).await.is_err());
        assert_eq!(ledger.block_number(), 1);
    }

    #[tokio::test]
    async fn test_transfer_to_funder_conserves_supply() {
        let ledger = TestLedger::builder()
            .with_funder_balance(U256::from(1_000u64))
            .build()
            .unwrap();
        let funder = ledger.funder();
        let supply = ledger.total_supply();

        ledger.transfer(funder, U256::from(400u64)).await.unwrap();
        assert_eq!(ledger.balance(funder).await.unwrap(), U256::from(1_000u64));
        assert_eq!(ledger.total_supply(), supply);
        assert_eq!(ledger.nonce(&funder), 1);
    }

    #[tokio::test]
    async fn test_contracts_get_distinct_addresses() {
        let ledger = TestLedger::builder().build().unwrap();
        let a = ledger.deploy_randao();
        let b = ledger.deploy_randao();
        let c = ledger
            .deploy_circle_problem(U256::one(), ProblemConfig::default(), 2, 8)
            .unwrap();
        assert_ne!(a.address(), b.address());
        assert_ne!(b.address(), randao_common::ledger::CircleProblemLedger::address(&c));
        assert_eq!(ledger.nonce(&ledger.funder()), 3);
    }

    #[tokio::test]
    async fn test_clones_share_chain() {
        let ledger = TestLedger::builder().build().unwrap();
        let other = ledger.clone();
        other.transfer(Address::new([1; 20]), U256::one()).await.unwrap();
        assert_eq!(ledger.block_number(), other.block_number());
        assert_eq!(ledger.events().len(), 0);
    }
}
