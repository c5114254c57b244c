//! secp256k1 key material for synthetic accounts.

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{Address, CryptoError, Hash, Signature};

/// Size of a secp256k1 secret key in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// Raw secp256k1 secret key (32 bytes).
///
/// The secret key is zeroized on drop for security.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; SECRET_KEY_SIZE]);

impl PrivateKey {
    /// Create a secret key from raw bytes.
    pub fn from_bytes(bytes: [u8; SECRET_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create a secret key from a hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut bytes = [0u8; SECRET_KEY_SIZE];
        hex::decode_to_slice(hex, &mut bytes).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes of the secret key.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// secp256k1 key pair with its derived ledger address.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    address: Address,
}

impl KeyPair {
    /// Generate a new random key pair using a cryptographically secure RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        let address = Self::derive_address(&signing_key);
        Self {
            signing_key,
            address,
        }
    }

    /// Create a key pair from secret key bytes.
    ///
    /// Fails when the bytes are zero or not below the curve order.
    pub fn from_secret_bytes(bytes: &[u8; SECRET_KEY_SIZE]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidSecretKey)?;
        let address = Self::derive_address(&signing_key);
        Ok(Self {
            signing_key,
            address,
        })
    }

    /// Create a key pair from a secret key.
    pub fn from_private_key(secret: &PrivateKey) -> Result<Self, CryptoError> {
        Self::from_secret_bytes(secret.as_bytes())
    }

    fn derive_address(signing_key: &SigningKey) -> Address {
        let encoded = signing_key.verifying_key().to_encoded_point(false);
        // An uncompressed encoding of a valid key is always 65 bytes with 0x04 prefix
        let digest = super::keccak256(&encoded.as_bytes()[1..]);
        Address::from_hash_tail(&digest)
    }

    /// Get the secret key.
    pub fn private_key(&self) -> PrivateKey {
        let mut bytes = [0u8; SECRET_KEY_SIZE];
        bytes.copy_from_slice(&self.signing_key.to_bytes());
        PrivateKey::from_bytes(bytes)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte prehash, RFC6979 deterministic and low-S normalized.
    pub fn sign_prehash(&self, prehash: &Hash) -> Result<Signature, CryptoError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(prehash.as_bytes())
            .map_err(|_| CryptoError::SigningFailed)?;
        Signature::from_parts(&signature, recovery_id)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
