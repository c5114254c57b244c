use thiserror::Error;

/// Errors that can occur during cryptographic operations
///
/// This error type provides structured error handling for all crypto module
/// operations, eliminating the need for .unwrap() calls that could cause panics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid hexadecimal string format
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    /// Address string is malformed or invalid
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    /// Secret key bytes are not a valid secp256k1 scalar
    #[error("Invalid secret key")]
    InvalidSecretKey,

    /// Public key is not a valid uncompressed secp256k1 point
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Signature has invalid length
    #[error("Invalid signature length: {len} bytes, expected: {expected} bytes")]
    InvalidSignatureLength { len: usize, expected: usize },

    /// Recovery byte is neither 27 nor 28
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// r or s are out of range
    #[error("Malformed signature")]
    MalformedSignature,

    /// Signing backend failed
    #[error("Signing failed")]
    SigningFailed,

    /// Public key recovery failed
    #[error("Public key recovery failed")]
    RecoveryFailed,
}
