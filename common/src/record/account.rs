use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::IslandId;
use crate::config::ACCOUNT_KEY_DOMAIN;
use crate::crypto::{keccak256_parts, Address, CryptoError, KeyPair};

/// Where account keys come from.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySource {
    /// Reproducible keys:
    /// `keccak256("randao-account" || be8(seed) || be8(index) || be4(retry))`,
    /// retried until the digest is a valid secret scalar.
    Deterministic { seed: u64 },
    /// Fresh keys from the OS CSPRNG on every run.
    SecureRandom,
}

impl Default for KeySource {
    fn default() -> Self {
        KeySource::Deterministic { seed: 0 }
    }
}

/// Synthetic identity used to own islands and sign records.
#[derive(Clone, Debug)]
pub struct Account {
    keypair: KeyPair,
    owned_islands: BTreeSet<IslandId>,
}

impl Account {
    pub fn new(keypair: KeyPair) -> Self {
        Self {
            keypair,
            owned_islands: BTreeSet::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    pub fn owned_islands(&self) -> &BTreeSet<IslandId> {
        &self.owned_islands
    }

    pub(crate) fn add_island(&mut self, island_id: IslandId) {
        self.owned_islands.insert(island_id);
    }
}

fn derive_keypair(seed: u64, index: u64) -> Result<KeyPair, CryptoError> {
    for retry in 0..u32::MAX {
        let secret = keccak256_parts(&[
            ACCOUNT_KEY_DOMAIN,
            &seed.to_be_bytes(),
            &index.to_be_bytes(),
            &retry.to_be_bytes(),
        ]);
        match KeyPair::from_secret_bytes(secret.as_bytes()) {
            Ok(keypair) => return Ok(keypair),
            Err(CryptoError::InvalidSecretKey) => {
                debug!("account {}: digest is not a valid scalar, retry {}", index, retry + 1);
            }
            Err(e) => return Err(e),
        }
    }
    Err(CryptoError::InvalidSecretKey)
}

/// Generate `count` accounts with no islands.
pub fn generate_accounts(count: usize, source: &KeySource) -> Result<Vec<Account>, CryptoError> {
    (0..count as u64)
        .map(|index| {
            let keypair = match source {
                KeySource::Deterministic { seed } => derive_keypair(*seed, index)?,
                KeySource::SecureRandom => KeyPair::generate(),
            };
            Ok(Account::new(keypair))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keccak256;

    #[test]
    fn test_deterministic_accounts_are_reproducible() {
        let source = KeySource::Deterministic { seed: 42 };
        let a = generate_accounts(5, &source).unwrap();
        let b = generate_accounts(5, &source).unwrap();
        let addresses_a: Vec<_> = a.iter().map(Account::address).collect();
        let addresses_b: Vec<_> = b.iter().map(Account::address).collect();
        assert_eq!(addresses_a, addresses_b);
    }

    #[test]
    fn test_deterministic_accounts_are_distinct() {
        let accounts = generate_accounts(10, &KeySource::Deterministic { seed: 1 }).unwrap();
        let unique: BTreeSet<_> = accounts.iter().map(Account::address).collect();
        assert_eq!(unique.len(), 10);

        let other = generate_accounts(1, &KeySource::Deterministic { seed: 2 }).unwrap();
        assert!(!unique.contains(&other[0].address()));
    }

    #[test]
    fn test_derivation_layout() {
        let mut input = Vec::new();
        input.extend_from_slice(b"randao-account");
        input.extend_from_slice(&7u64.to_be_bytes());
        input.extend_from_slice(&0u64.to_be_bytes());
        input.extend_from_slice(&0u32.to_be_bytes());
        let expected = KeyPair::from_secret_bytes(keccak256(&input).as_bytes()).unwrap();

        let account = generate_accounts(1, &KeySource::Deterministic { seed: 7 }).unwrap();
        assert_eq!(account[0].address(), expected.address());
    }

    #[test]
    fn test_secure_random_accounts() {
        let accounts = generate_accounts(3, &KeySource::SecureRandom).unwrap();
        let unique: BTreeSet<_> = accounts.iter().map(Account::address).collect();
        assert_eq!(unique.len(), 3);
        assert!(accounts.iter().all(|a| a.owned_islands().is_empty()));
    }
}
