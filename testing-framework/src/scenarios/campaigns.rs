//! Islands and paid campaigns on a fresh registry.

use anyhow::{ensure, Context, Result};
use log::{debug, info};
use primitive_types::U256;
use serde::Serialize;

use randao_common::crypto::Address;
use randao_common::ledger::{EmittedEvent, EventKind, FundingLedger, LedgerEvent, RandaoLedger};
use randao_common::record::{AccountInventory, Island};

use super::ScenarioContext;
use crate::config::CampaignSettings;
use crate::invariants::{check_balance_conservation, check_island_uniqueness};

#[derive(Debug, Clone, Serialize)]
pub struct CampaignsReport {
    pub contract: Address,
    pub islands: Vec<Island>,
    /// One `NewCampaign` event per created campaign, in creation order
    pub campaigns: Vec<EmittedEvent>,
    pub total_paid: U256,
}

/// Create every campaign from the connected signer and read each
/// `NewCampaign` event back from the block of its receipt.
pub async fn create_campaigns<L>(
    ledger: &L,
    campaigns: &[CampaignSettings],
) -> Result<Vec<EmittedEvent>>
where
    L: RandaoLedger + ?Sized,
{
    let mut events = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        let task = U256::from(campaign.task);
        let payment = campaign.payment();
        let receipt = ledger
            .create_campaign(task, payment)
            .await
            .with_context(|| format!("Failed to create campaign for task {}", campaign.task))?;

        let mut found = ledger
            .query_events(EventKind::NewCampaign, receipt.block_number, receipt.block_number)
            .await
            .context("Failed to query NewCampaign events")?;
        ensure!(
            found.len() == 1,
            "expected one NewCampaign event in block {}, found {}",
            receipt.block_number,
            found.len()
        );
        let event = found.remove(0);
        match &event.event {
            LedgerEvent::NewCampaign {
                task: emitted_task,
                payment: emitted_payment,
                ..
            } => ensure!(
                *emitted_task == task && *emitted_payment == payment,
                "NewCampaign event does not match task {}",
                campaign.task
            ),
            other => anyhow::bail!("unexpected event {:?}", other),
        }
        debug!(
            "campaign for task {} created in block {}",
            campaign.task, receipt.block_number
        );
        events.push(event);
    }
    Ok(events)
}

/// Register islands `{1 → a1, 2 → a2, 3 → a1}` on a new registry, then
/// create the configured campaigns.
pub async fn run_campaigns(ctx: &mut ScenarioContext) -> Result<CampaignsReport> {
    let randao = ctx.ledger.deploy_randao();
    let key_source = ctx.config.records.key_source(ctx.env.seed());
    let mut inventory = AccountInventory::generate(2, &key_source)?;
    let a1 = inventory.accounts()[0].address();
    let a2 = inventory.accounts()[1].address();
    for (owner, island_id) in [(a1, 1), (a2, 2), (a1, 3)] {
        inventory.assign_island(&owner, island_id)?;
    }
    check_island_uniqueness(&inventory.islands())?;

    inventory.register_islands(&randao).await?;
    ensure!(
        inventory.check_islands_ownership(&randao).await?,
        "island ownership does not match the registry"
    );

    let supply_before = ctx.ledger.total_supply();
    let funder_before = ctx.ledger.balance(ctx.ledger.funder()).await?;
    let campaigns = create_campaigns(&randao, &ctx.config.campaigns).await?;

    let total_paid = ctx
        .config
        .campaigns
        .iter()
        .fold(U256::zero(), |acc, c| acc.saturating_add(c.payment()));
    let contract_balance = ctx.ledger.balance(randao.address()).await?;
    ensure!(
        contract_balance == total_paid,
        "registry holds {} wei, campaigns paid {}",
        contract_balance,
        total_paid
    );
    let funder_after = ctx.ledger.balance(ctx.ledger.funder()).await?;
    let debited = funder_before.saturating_sub(funder_after);
    ensure!(
        debited == total_paid,
        "funder was debited {} wei, campaigns paid {}",
        debited,
        total_paid
    );
    check_balance_conservation(supply_before, ctx.ledger.total_supply())?;

    info!(
        "{} islands registered, {} campaigns created",
        inventory.islands().len(),
        campaigns.len()
    );
    Ok(CampaignsReport {
        contract: randao.address(),
        islands: inventory.islands(),
        campaigns,
        total_paid,
    })
}
