use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use super::{keccak256, CryptoError};

pub const ADDRESS_SIZE: usize = 20;

/// 20-byte account address, derived the Ethereum way from a secp256k1 key.
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Hash, Default)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    pub const fn zero() -> Self {
        Address([0; ADDRESS_SIZE])
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    /// Address of an uncompressed SEC1 public key (`0x04 || X || Y`):
    /// the last 20 bytes of `keccak256(X || Y)`.
    pub fn from_uncompressed_key(encoded: &[u8]) -> Result<Self, CryptoError> {
        if encoded.len() != 65 || encoded[0] != 0x04 {
            return Err(CryptoError::InvalidPublicKey);
        }
        let digest = keccak256(&encoded[1..]);
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&digest.as_bytes()[12..]);
        Ok(Address(bytes))
    }

    /// Derive an address from the tail of a hash (contract address scheme).
    pub fn from_hash_tail(hash: &super::Hash) -> Self {
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&hash.as_bytes()[12..]);
        Address(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != ADDRESS_SIZE * 2 {
            return Err(CryptoError::InvalidAddress(s.to_string()));
        }
        let mut bytes = [0u8; ADDRESS_SIZE];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Ok(Address(bytes))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(SerdeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_roundtrip() {
        let addr: Address = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8".parse().unwrap();
        assert_eq!(addr.to_string(), "0x70997970c51812dc3a010c7d01b50e0d17dc79c8");
    }

    #[test]
    fn test_address_rejects_bad_length() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("zz997970c51812dc3a010c7d01b50e0d17dc79c8".parse::<Address>().is_err());
    }

    #[test]
    fn test_from_uncompressed_key_requires_prefix() {
        let mut encoded = [0u8; 65];
        assert!(Address::from_uncompressed_key(&encoded).is_err());
        encoded[0] = 0x04;
        assert!(Address::from_uncompressed_key(&encoded).is_ok());
        assert!(Address::from_uncompressed_key(&encoded[..64]).is_err());
    }
}
