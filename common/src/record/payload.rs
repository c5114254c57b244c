use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::{IslandId, RecordError};
use crate::config::RECORD_PAYLOAD_SIZE;
use crate::crypto::{Address, Hash};
use crate::utils::u256_to_be_bytes;

/// Data a record attests to, in the order the registry packs it:
/// `be32(island_id) || owner(20) || be32(sequence) || data(32)`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordPayload {
    pub island_id: IslandId,
    pub owner: Address,
    pub sequence: u64,
    pub data: Hash,
}

impl RecordPayload {
    pub fn new(island_id: IslandId, owner: Address, sequence: u64, data: Hash) -> Self {
        Self {
            island_id,
            owner,
            sequence,
            data,
        }
    }

    pub fn encode(&self) -> [u8; RECORD_PAYLOAD_SIZE] {
        let mut bytes = [0u8; RECORD_PAYLOAD_SIZE];
        bytes[0..32].copy_from_slice(&u256_to_be_bytes(&U256::from(self.island_id)));
        bytes[32..52].copy_from_slice(self.owner.as_bytes());
        bytes[52..84].copy_from_slice(&u256_to_be_bytes(&U256::from(self.sequence)));
        bytes[84..116].copy_from_slice(self.data.as_bytes());
        bytes
    }

    /// Inverse of `encode`.
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        if bytes.len() != RECORD_PAYLOAD_SIZE {
            return Err(RecordError::InvalidPayloadLength {
                len: bytes.len(),
                expected: RECORD_PAYLOAD_SIZE,
            });
        }

        let word = |name: &'static str, range: std::ops::Range<usize>| {
            let value = U256::from_big_endian(&bytes[range]);
            if value > U256::from(u64::MAX) {
                return Err(RecordError::FieldOutOfRange(name));
            }
            Ok(value.low_u64())
        };

        let mut owner = [0u8; 20];
        owner.copy_from_slice(&bytes[32..52]);
        let mut data = [0u8; 32];
        data.copy_from_slice(&bytes[84..116]);

        Ok(Self {
            island_id: word("island_id", 0..32)?,
            owner: Address::new(owner),
            sequence: word("sequence", 52..84)?,
            data: Hash::new(data),
        })
    }
}
