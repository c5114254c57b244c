mod address;
mod hash;
mod key;
mod signature;

pub mod error;
pub mod random;

pub use address::*;
pub use error::CryptoError;
pub use hash::*;
pub use key::{KeyPair, PrivateKey, SECRET_KEY_SIZE};
pub use signature::{eth_message_hash, Signature, ETH_MESSAGE_PREFIX, SIGNATURE_SIZE};
