//! Shared chain state behind every contract handle of a `TestLedger`.

use anyhow::{bail, Result};
use log::debug;
use primitive_types::U256;
use std::collections::HashMap;

use randao_common::crypto::{keccak256_parts, Address};
use randao_common::ledger::{EmittedEvent, EventKind, LedgerEvent, TxReceipt};

/// Blocks, balances, nonces and the event log.
///
/// Every committed transaction is mined alone in a new block. Calls that
/// revert fail before `commit`, leaving no trace, the way a client that
/// estimates gas first would see them.
#[derive(Debug)]
pub struct ChainState {
    block_number: u64,
    nonces: HashMap<Address, u64>,
    balances: HashMap<Address, U256>,
    events: Vec<EmittedEvent>,
}

impl ChainState {
    pub fn new(start_block: u64, balances: HashMap<Address, U256>) -> Self {
        Self {
            block_number: start_block,
            nonces: HashMap::new(),
            balances,
            events: Vec::new(),
        }
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn nonce(&self, address: &Address) -> u64 {
        self.nonces.get(address).copied().unwrap_or(0)
    }

    pub fn balance(&self, address: &Address) -> U256 {
        self.balances.get(address).copied().unwrap_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.balances
            .values()
            .fold(U256::zero(), |acc, balance| acc.saturating_add(*balance))
    }

    /// Address the next contract created by `deployer` will get:
    /// `keccak256(deployer || be8(nonce))[12..]`.
    pub fn create_address(&self, deployer: &Address) -> Address {
        let nonce = self.nonce(deployer);
        let digest = keccak256_parts(&[deployer.as_bytes(), &nonce.to_be_bytes()]);
        Address::from_hash_tail(&digest)
    }

    pub fn move_value(&mut self, from: &Address, to: &Address, amount: U256) -> Result<()> {
        let available = self.balance(from);
        let Some(remaining) = available.checked_sub(amount) else {
            bail!(
                "insufficient funds: {} has {} wei, needs {}",
                from,
                available,
                amount
            );
        };
        if from == to {
            return Ok(());
        }
        let Some(credited) = self.balance(to).checked_add(amount) else {
            bail!("balance overflow for {}", to);
        };
        self.balances.insert(*from, remaining);
        self.balances.insert(*to, credited);
        Ok(())
    }

    /// Mine one transaction from `sender` emitting `events`.
    pub fn commit(&mut self, sender: Address, events: Vec<(Address, LedgerEvent)>) -> TxReceipt {
        let nonce = self.nonce(&sender);
        self.nonces.insert(sender, nonce + 1);
        self.block_number += 1;

        let tx_hash = keccak256_parts(&[
            b"randao-tx",
            sender.as_bytes(),
            &nonce.to_be_bytes(),
            &self.block_number.to_be_bytes(),
        ]);
        let receipt = TxReceipt {
            tx_hash,
            block_number: self.block_number,
        };

        for (contract, event) in events {
            debug!("block {}: {} emitted {:?}", receipt.block_number, contract, event.kind());
            self.events.push(EmittedEvent {
                contract,
                block_number: receipt.block_number,
                tx_hash,
                event,
            });
        }
        receipt
    }

    /// Events of `kind` from `contract` mined in `[from_block, to_block]`.
    pub fn events(
        &self,
        contract: &Address,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> Vec<EmittedEvent> {
        self.events
            .iter()
            .filter(|e| {
                e.contract == *contract
                    && e.event.kind() == kind
                    && (from_block..=to_block).contains(&e.block_number)
            })
            .cloned()
            .collect()
    }

    pub fn all_events(&self) -> &[EmittedEvent] {
        &self.events
    }
}
