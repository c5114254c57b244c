use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{keccak256_parts, Address, CryptoError, Hash};

/// Size of a recoverable signature: `r(32) || s(32) || v(1)`.
pub const SIGNATURE_SIZE: usize = 65;

/// Prefix the ledger applies before recovering a personal-message signer.
pub const ETH_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Hash that is actually signed for a 32-byte message digest:
/// `keccak256("\x19Ethereum Signed Message:\n32" || digest)`.
pub fn eth_message_hash(digest: &Hash) -> Hash {
    keccak256_parts(&[ETH_MESSAGE_PREFIX, digest.as_bytes()])
}

/// Recoverable secp256k1 signature in the ledger's `r || s || v` layout,
/// with `v` in `{27, 28}`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_SIZE]);

impl Signature {
    /// Create a signature from raw bytes.
    pub fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create a signature from a slice.
    pub fn from_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        if slice.len() != SIGNATURE_SIZE {
            return Err(CryptoError::InvalidSignatureLength {
                len: slice.len(),
                expected: SIGNATURE_SIZE,
            });
        }
        let mut bytes = [0u8; SIGNATURE_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Create a signature from a hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes = hex::decode(hex).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub(crate) fn from_parts(signature: &EcdsaSignature, recovery_id: RecoveryId) -> Result<Self, CryptoError> {
        let recid = recovery_id.to_byte();
        if recid > 1 {
            return Err(CryptoError::SigningFailed);
        }
        let mut bytes = [0u8; SIGNATURE_SIZE];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = 27 + recid;
        Ok(Self(bytes))
    }

    /// Get the raw bytes of the signature.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    pub fn r(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[32..64]
    }

    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Recover the signer address of a prehashed message.
    pub fn recover_address(&self, prehash: &Hash) -> Result<Address, CryptoError> {
        let recid = match self.v() {
            27 => 0,
            28 => 1,
            other => return Err(CryptoError::InvalidRecoveryId(other)),
        };
        let recovery_id = RecoveryId::from_byte(recid).ok_or(CryptoError::InvalidRecoveryId(recid))?;
        let signature =
            EcdsaSignature::from_slice(&self.0[..64]).map_err(|_| CryptoError::MalformedSignature)?;
        let key = VerifyingKey::recover_from_prehash(prehash.as_bytes(), &signature, recovery_id)
            .map_err(|_| CryptoError::RecoveryFailed)?;
        Address::from_uncompressed_key(key.to_encoded_point(false).as_bytes())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
