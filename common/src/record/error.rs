use thiserror::Error;

use super::IslandId;
use crate::crypto::{Address, CryptoError, Hash};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid payload length: {len} bytes, expected: {expected} bytes")]
    InvalidPayloadLength { len: usize, expected: usize },

    #[error("Payload field {0} does not fit in 64 bits")]
    FieldOutOfRange(&'static str),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// An island id was handed to a second owner. Always a bug in the
    /// assignment step.
    #[error("Island {island_id} is already owned by {owner}, cannot assign it to {requested_by}")]
    IslandIdCollision {
        island_id: IslandId,
        owner: Address,
        requested_by: Address,
    },

    #[error("Unknown account {0}")]
    UnknownAccount(Address),

    #[error("No accounts to assign islands to")]
    NoAccounts,

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Local and remote signature checks disagree, or the remote check could
/// not be performed.
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Verification divergence on record {digest} signed by {signer}: local={local}, remote={remote}")]
    Divergence {
        signer: Address,
        digest: Hash,
        local: bool,
        remote: bool,
    },

    #[error(transparent)]
    Ledger(#[from] anyhow::Error),
}
