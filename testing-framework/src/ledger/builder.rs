//! TestLedgerBuilder - Fluent API for configuring TestLedger instances

use anyhow::{Context, Result};
use primitive_types::U256;
use std::collections::HashMap;

use randao_common::config::WEI_PER_ETHER;
use randao_common::crypto::Address;

use super::{ChainState, TestLedger};

/// Address of the first well-known development account, used as the
/// deployer and funder unless overridden.
pub const DEFAULT_FUNDER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

// Balance of the funder unless overridden
const DEFAULT_FUNDER_ETHER: u64 = 10_000;

/// Builder for TestLedger instances with fluent API
///
/// # Example
///
/// ```rust
/// use randao_testing_framework::ledger::TestLedgerBuilder;
/// use primitive_types::U256;
///
/// let ledger = TestLedgerBuilder::new()
///     .with_funder_balance(U256::from(10u64).pow(U256::from(21u64)))
///     .with_start_block(100)
///     .build()
///     .unwrap();
/// assert_eq!(ledger.block_number(), 100);
/// ```
pub struct TestLedgerBuilder {
    funder: Option<Address>,
    funder_balance: U256,
    funded_accounts: Vec<(Address, U256)>,
    start_block: u64,
}

impl TestLedgerBuilder {
    /// Default configuration:
    /// - the well-known development account as funder
    /// - 10,000 ETH funder balance, starting at block 0
    pub fn new() -> Self {
        Self {
            funder: None,
            funder_balance: U256::from(WEI_PER_ETHER) * U256::from(DEFAULT_FUNDER_ETHER),
            funded_accounts: Vec::new(),
            start_block: 0,
        }
    }

    pub fn with_funder(mut self, funder: Address) -> Self {
        self.funder = Some(funder);
        self
    }

    pub fn with_funder_balance(mut self, balance: U256) -> Self {
        self.funder_balance = balance;
        self
    }

    /// Give `address` a starting balance.
    pub fn with_funded_account(mut self, address: Address, balance: U256) -> Self {
        self.funded_accounts.push((address, balance));
        self
    }

    /// Height of the chain before the first transaction.
    pub fn with_start_block(mut self, block: u64) -> Self {
        self.start_block = block;
        self
    }

    pub fn build(self) -> Result<TestLedger> {
        let funder = match self.funder {
            Some(funder) => funder,
            None => DEFAULT_FUNDER
                .parse()
                .context("Failed to parse default funder address")?,
        };

        let mut balances = HashMap::new();
        for (address, balance) in self.funded_accounts {
            balances.insert(address, balance);
        }
        balances.insert(funder, self.funder_balance);

        Ok(TestLedger::new(ChainState::new(self.start_block, balances), funder))
    }
}

impl Default for TestLedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
