//! Accounts sign records for their islands; both the local routine and
//! the registry must accept every signature.

use anyhow::{ensure, Result};
use log::info;
use primitive_types::U256;
use serde::Serialize;

use randao_common::crypto::Address;
use randao_common::ledger::RandaoLedger;
use randao_common::record::{Account, AccountInventory, Island, VerificationSummary};

use super::ScenarioContext;
use crate::invariants::{check_balance_conservation, check_island_uniqueness};
use crate::utilities::RecordsArtifact;

#[derive(Debug, Clone, Serialize)]
pub struct RecordsSignatureReport {
    pub contract: Address,
    pub accounts: usize,
    pub islands: Vec<Island>,
    pub records: usize,
    pub funded_each: U256,
    pub local: VerificationSummary,
    pub remote: VerificationSummary,
}

fn records_artifact(contract: Address, inventory: &AccountInventory) -> RecordsArtifact {
    RecordsArtifact {
        contract,
        accounts: inventory.accounts().iter().map(Account::address).collect(),
        islands: inventory.islands(),
        records: inventory.records().to_vec(),
        local: None,
        remote: None,
    }
}

pub async fn run_records_signature(ctx: &mut ScenarioContext) -> Result<RecordsSignatureReport> {
    let settings = ctx.config.records.clone();
    let randao = ctx.ledger.deploy_randao();

    let key_source = settings.key_source(ctx.env.seed());
    let mut inventory = AccountInventory::generate(settings.account_count, &key_source)?;
    inventory.assign_islands(settings.island_plan())?;
    check_island_uniqueness(&inventory.islands())?;
    ctx.artifacts
        .set_records(records_artifact(randao.address(), &inventory));
    info!(
        "{} accounts generated with {} islands",
        inventory.accounts().len(),
        inventory.islands().len()
    );

    inventory.register_islands(&randao).await?;
    ensure!(
        inventory.check_islands_ownership(&randao).await?,
        "island ownership does not match the registry"
    );

    let supply_before = ctx.ledger.total_supply();
    let funding = settings.funding();
    inventory.fund(&ctx.ledger, funding).await?;
    check_balance_conservation(supply_before, ctx.ledger.total_supply())?;

    let mut rng = ctx.env.rng.fork();
    let inserted = inventory
        .insert_random_records(&randao, &mut rng, settings.records_per_island)
        .await;
    ctx.artifacts
        .set_records(records_artifact(randao.address(), &inventory));
    let receipts = inserted?;
    ensure!(
        randao.record_count() == receipts.len(),
        "registry holds {} records, {} were submitted",
        randao.record_count(),
        receipts.len()
    );

    let local = inventory.verify_records_local();
    if let Some(artifact) = ctx.artifacts.records_mut() {
        artifact.local = Some(local);
    }
    ensure!(
        local.all_valid(),
        "{} of {} records fail local verification",
        local.invalid,
        local.total
    );

    let remote = inventory.verify_records_remote(&randao).await?;
    if let Some(artifact) = ctx.artifacts.records_mut() {
        artifact.remote = Some(remote);
    }
    ensure!(
        remote.all_valid(),
        "{} of {} records fail verification on the registry",
        remote.invalid,
        remote.total
    );

    info!(
        "{} records signed and verified locally and on {}",
        local.total,
        randao.address()
    );
    Ok(RecordsSignatureReport {
        contract: randao.address(),
        accounts: inventory.accounts().len(),
        islands: inventory.islands(),
        records: inventory.records().len(),
        funded_each: funding,
        local,
        remote,
    })
}
