//! In-process FREE_RANDAO registry: islands, paid campaigns and signed
//! records.

use anyhow::{bail, ensure, Context, Result};
use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use log::debug;
use parking_lot::Mutex;
use primitive_types::U256;
use serde::Serialize;
use sha3::{Digest, Keccak256};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use randao_common::crypto::Address;
use randao_common::ledger::{EmittedEvent, EventKind, LedgerEvent, RandaoLedger, TxReceipt};
use randao_common::record::{IslandId, Record};

use super::chain::ChainState;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Campaign {
    pub campaign_id: u64,
    pub task: U256,
    pub payment: U256,
    pub creator: Address,
}

#[derive(Default)]
struct Storage {
    islands: BTreeMap<IslandId, Address>,
    campaigns: Vec<Campaign>,
    // (island, sequence) of every accepted record
    records: BTreeSet<(IslandId, u64)>,
}

/// `keccak256("\x19Ethereum Signed Message:\n32" || keccak256(message))`
fn prefixed_hash(message: &[u8]) -> [u8; 32] {
    let inner = Keccak256::digest(message);
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n32");
    hasher.update(inner);
    hasher.finalize().into()
}

/// `ecrecover(hash, v, r, s)`. `None` for anything the precompile would
/// answer with the zero address.
fn ecrecover(hash: &[u8; 32], v: u8, r: &[u8], s: &[u8]) -> Option<Address> {
    let recovery_id = match v {
        27 => RecoveryId::from_byte(0)?,
        28 => RecoveryId::from_byte(1)?,
        _ => return None,
    };
    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(r);
    rs[32..].copy_from_slice(s);
    let signature = EcdsaSignature::from_slice(&rs).ok()?;
    let key = VerifyingKey::recover_from_prehash(hash, &signature, recovery_id).ok()?;

    let point = key.to_encoded_point(false);
    let digest = Keccak256::digest(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Some(Address::new(bytes))
}

/// Signer the contract recovers for a record.
fn recover_record_signer(record: &Record) -> Option<Address> {
    let signature = record.signature.as_bytes();
    ecrecover(
        &prefixed_hash(&record.payload),
        signature[64],
        &signature[..32],
        &signature[32..64],
    )
}

#[derive(Clone)]
pub struct RandaoContract {
    address: Address,
    sender: Address,
    storage: Arc<Mutex<Storage>>,
    chain: Arc<Mutex<ChainState>>,
}

impl RandaoContract {
    pub(crate) fn deploy(chain: Arc<Mutex<ChainState>>, deployer: Address) -> Self {
        let address = {
            let mut chain = chain.lock();
            let address = chain.create_address(&deployer);
            let receipt = chain.commit(deployer, Vec::new());
            debug!("randao deployed at {} in block {}", address, receipt.block_number);
            address
        };
        Self {
            address,
            sender: deployer,
            storage: Arc::new(Mutex::new(Storage::default())),
            chain,
        }
    }

    pub fn campaigns(&self) -> Vec<Campaign> {
        self.storage.lock().campaigns.clone()
    }

    pub fn islands(&self) -> BTreeMap<IslandId, Address> {
        self.storage.lock().islands.clone()
    }

    pub fn record_count(&self) -> usize {
        self.storage.lock().records.len()
    }
}

#[async_trait]
impl RandaoLedger for RandaoContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn register_island(&self, island_id: IslandId, owner: Address) -> Result<TxReceipt> {
        let mut storage = self.storage.lock();
        if let Some(current) = storage.islands.get(&island_id) {
            bail!(
                "execution reverted: island {} already registered to {}",
                island_id,
                current
            );
        }
        storage.islands.insert(island_id, owner);
        Ok(self.chain.lock().commit(
            self.sender,
            vec![(self.address, LedgerEvent::IslandRegistered { island_id, owner })],
        ))
    }

    async fn island_owner(&self, island_id: IslandId) -> Result<Option<Address>> {
        Ok(self.storage.lock().islands.get(&island_id).copied())
    }

    async fn create_campaign(&self, task: U256, payment: U256) -> Result<TxReceipt> {
        ensure!(!payment.is_zero(), "execution reverted: campaign payment must be positive");

        let mut storage = self.storage.lock();
        let mut chain = self.chain.lock();
        chain
            .move_value(&self.sender, &self.address, payment)
            .context("execution reverted: cannot pay campaign")?;

        let campaign = Campaign {
            campaign_id: storage.campaigns.len() as u64,
            task,
            payment,
            creator: self.sender,
        };
        let event = LedgerEvent::NewCampaign {
            campaign_id: campaign.campaign_id,
            task,
            payment,
            creator: campaign.creator,
        };
        storage.campaigns.push(campaign);
        Ok(chain.commit(self.sender, vec![(self.address, event)]))
    }

    async fn submit_record(&self, record: &Record) -> Result<TxReceipt> {
        let payload = record
            .decode_payload()
            .context("execution reverted: malformed record payload")?;

        let mut storage = self.storage.lock();
        match storage.islands.get(&payload.island_id) {
            None => bail!(
                "execution reverted: island {} is not registered",
                payload.island_id
            ),
            Some(owner) if *owner != record.signer => bail!(
                "execution reverted: {} does not own island {}",
                record.signer,
                payload.island_id
            ),
            Some(_) => {}
        }
        ensure!(
            payload.owner == record.signer,
            "execution reverted: payload owner {} is not the sender {}",
            payload.owner,
            record.signer
        );
        ensure!(
            recover_record_signer(record) == Some(record.signer),
            "execution reverted: invalid record signature"
        );
        ensure!(
            !storage.records.contains(&(payload.island_id, payload.sequence)),
            "execution reverted: record {} of island {} already inserted",
            payload.sequence,
            payload.island_id
        );

        let mut chain = self.chain.lock();
        ensure!(
            !chain.balance(&record.signer).is_zero(),
            "insufficient funds for gas: {} has no balance",
            record.signer
        );
        storage.records.insert((payload.island_id, payload.sequence));
        Ok(chain.commit(
            record.signer,
            vec![(
                self.address,
                LedgerEvent::RecordInserted {
                    island_id: payload.island_id,
                    signer: record.signer,
                    sequence: payload.sequence,
                    digest: record.digest(),
                },
            )],
        ))
    }

    async fn verify_record_signature(&self, record: &Record) -> Result<bool> {
        Ok(recover_record_signer(record) == Some(record.signer))
    }

    async fn query_events(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EmittedEvent>> {
        Ok(self.chain.lock().events(&self.address, kind, from_block, to_block))
    }
}
