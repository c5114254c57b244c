//! Synthetic accounts, islands and signed records.
//!
//! A record is signed over `keccak256("\x19Ethereum Signed Message:\n32" ||
//! keccak256(payload))` so the registry contract's `ecrecover` check and the
//! local recovery agree on what was signed.

mod account;
mod error;
mod inventory;
mod island;
mod payload;
mod signed;

pub use account::{generate_accounts, Account, KeySource};
pub use error::{InventoryError, RecordError, VerificationError};
pub use inventory::{verify_remote, AccountInventory, VerificationSummary};
pub use island::{assign_islands, Island, IslandAllocator, IslandId, IslandPlan};
pub use payload::RecordPayload;
pub use signed::{sign_bytes, sign_record, Record};
