use anyhow::{Context, Result};
use futures::future::try_join_all;
use log::{debug, info, warn};
use primitive_types::U256;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{
    assign_islands, generate_accounts, sign_record, Account, Island, IslandAllocator, IslandId,
    IslandPlan, InventoryError, KeySource, Record, RecordPayload, VerificationError,
};
use crate::crypto::{Address, Hash};
use crate::ledger::{FundingLedger, RandaoLedger, TxReceipt};

/// Outcome of checking every record of an inventory.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerificationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl VerificationSummary {
    pub fn all_valid(&self) -> bool {
        self.invalid == 0
    }

    fn count(&mut self, valid: bool) {
        self.total += 1;
        if valid {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
    }
}

/// Cross-check one record against the ledger's own verifier. The local
/// result is returned when both agree.
pub async fn verify_remote<L>(record: &Record, ledger: &L) -> Result<bool, VerificationError>
where
    L: RandaoLedger + ?Sized,
{
    let local = record.verify_local();
    let remote = ledger.verify_record_signature(record).await?;
    if local != remote {
        return Err(VerificationError::Divergence {
            signer: record.signer,
            digest: record.digest(),
            local,
            remote,
        });
    }
    Ok(local)
}

/// Accounts, their islands and the records they signed during one run.
///
/// Not shared: mutation goes through `&mut self`, ledger calls for
/// independent islands or records are issued concurrently.
#[derive(Debug, Default)]
pub struct AccountInventory {
    accounts: Vec<Account>,
    index: BTreeMap<Address, usize>,
    allocator: IslandAllocator,
    records: Vec<Record>,
}

impl AccountInventory {
    pub fn new(accounts: Vec<Account>) -> Self {
        let index = accounts
            .iter()
            .enumerate()
            .map(|(i, account)| (account.address(), i))
            .collect();
        Self {
            accounts,
            index,
            allocator: IslandAllocator::new(),
            records: Vec::new(),
        }
    }

    pub fn generate(count: usize, source: &KeySource) -> Result<Self, InventoryError> {
        Ok(Self::new(generate_accounts(count, source)?))
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.index.get(address).map(|i| &self.accounts[*i])
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn islands(&self) -> Vec<Island> {
        self.allocator.islands()
    }

    pub fn owner_of(&self, island_id: IslandId) -> Option<Address> {
        self.allocator.owner_of(island_id)
    }

    pub fn assign_islands(
        &mut self,
        plan: IslandPlan,
    ) -> Result<BTreeMap<Address, BTreeSet<IslandId>>, InventoryError> {
        assign_islands(&mut self.accounts, plan, &mut self.allocator)
    }

    /// Give `island_id` to the account at `address`.
    pub fn assign_island(&mut self, address: &Address, island_id: IslandId) -> Result<(), InventoryError> {
        let i = *self
            .index
            .get(address)
            .ok_or(InventoryError::UnknownAccount(*address))?;
        self.allocator.claim(island_id, *address)?;
        self.accounts[i].add_island(island_id);
        Ok(())
    }

    /// Sign with the account at `address` and keep the record.
    pub fn sign_record(&mut self, address: &Address, payload: &RecordPayload) -> Result<&Record, InventoryError> {
        let account = self
            .account(address)
            .ok_or(InventoryError::UnknownAccount(*address))?;
        let record = sign_record(account, payload)?;
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Register every island with its owner, all calls in flight at once.
    pub async fn register_islands<L>(&self, ledger: &L) -> Result<Vec<TxReceipt>>
    where
        L: RandaoLedger + ?Sized,
    {
        let islands = self.islands();
        info!("Registering {} islands for {} accounts", islands.len(), self.accounts.len());
        let receipts = try_join_all(
            islands
                .iter()
                .map(|island| ledger.register_island(island.island_id, island.owner)),
        )
        .await
        .context("Failed to register islands")?;

        for (island, receipt) in islands.iter().zip(&receipts) {
            debug!(
                "Island {} registered for {} in block {}",
                island.island_id, island.owner, receipt.block_number
            );
        }
        Ok(receipts)
    }

    /// True when the ledger reports the local owner for every island.
    pub async fn check_islands_ownership<L>(&self, ledger: &L) -> Result<bool>
    where
        L: RandaoLedger + ?Sized,
    {
        let mut all_match = true;
        for island in self.islands() {
            let owner = ledger
                .island_owner(island.island_id)
                .await
                .with_context(|| format!("Failed to query owner of island {}", island.island_id))?;
            if owner != Some(island.owner) {
                warn!(
                    "Island {} owner mismatch: local {}, ledger {:?}",
                    island.island_id, island.owner, owner
                );
                all_match = false;
            }
        }
        Ok(all_match)
    }

    /// Send `amount` to every account. Transfers share the funder's
    /// nonce, so they go out one after another.
    pub async fn fund<F>(&self, ledger: &F, amount: U256) -> Result<Vec<TxReceipt>>
    where
        F: FundingLedger + ?Sized,
    {
        let mut receipts = Vec::with_capacity(self.accounts.len());
        for account in &self.accounts {
            let receipt = ledger
                .transfer(account.address(), amount)
                .await
                .with_context(|| format!("Failed to fund {}", account.address()))?;
            receipts.push(receipt);
        }
        info!("Funded {} accounts with {} wei each", receipts.len(), amount);
        Ok(receipts)
    }

    /// Sign `per_island` records with random data for every owned island,
    /// submit them all and keep them for verification.
    pub async fn insert_random_records<L, R>(
        &mut self,
        ledger: &L,
        rng: &mut R,
        per_island: usize,
    ) -> Result<Vec<TxReceipt>>
    where
        L: RandaoLedger + ?Sized,
        R: Rng,
    {
        let mut batch = Vec::new();
        for account in &self.accounts {
            for island_id in account.owned_islands() {
                for sequence in 0..per_island as u64 {
                    let mut data = [0u8; 32];
                    rng.fill(&mut data);
                    let payload = RecordPayload::new(*island_id, account.address(), sequence, Hash::new(data));
                    batch.push(sign_record(account, &payload)?);
                }
            }
        }

        info!("Submitting {} records", batch.len());
        let receipts = try_join_all(batch.iter().map(|record| ledger.submit_record(record)))
            .await
            .context("Failed to submit records")?;
        self.records.extend(batch);
        Ok(receipts)
    }

    pub fn verify_records_local(&self) -> VerificationSummary {
        let mut summary = VerificationSummary::default();
        for record in &self.records {
            summary.count(record.verify_local());
        }
        summary
    }

    /// Check every record both ways; stops at the first divergence.
    pub async fn verify_records_remote<L>(&self, ledger: &L) -> Result<VerificationSummary, VerificationError>
    where
        L: RandaoLedger + ?Sized,
    {
        let mut summary = VerificationSummary::default();
        for record in &self.records {
            summary.count(verify_remote(record, ledger).await?);
        }
        Ok(summary)
    }
}
