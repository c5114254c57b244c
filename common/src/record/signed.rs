use serde::{Deserialize, Serialize};

use super::{Account, RecordError, RecordPayload};
use crate::crypto::{eth_message_hash, keccak256, Address, CryptoError, Hash, Signature};

/// A payload signed by one account.
///
/// `payload` holds the canonical packed bytes exactly as signed, so a
/// record is checked against what was signed, not a re-encoding of it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Record {
    #[serde(with = "hex")]
    pub payload: Vec<u8>,
    pub signer: Address,
    pub signature: Signature,
}

impl Record {
    /// `keccak256(payload)`
    pub fn digest(&self) -> Hash {
        keccak256(&self.payload)
    }

    /// Hash the signature is computed over (personal-message prefixed digest).
    pub fn signing_hash(&self) -> Hash {
        eth_message_hash(&self.digest())
    }

    pub fn decode_payload(&self) -> Result<RecordPayload, RecordError> {
        RecordPayload::decode(&self.payload)
    }

    /// Address recovered from the signature.
    pub fn recover_signer(&self) -> Result<Address, CryptoError> {
        self.signature.recover_address(&self.signing_hash())
    }

    /// True when the signature recovers to `signer`. Malformed signatures
    /// verify false. No ledger access.
    pub fn verify_local(&self) -> bool {
        matches!(self.recover_signer(), Ok(address) if address == self.signer)
    }
}

/// Sign arbitrary payload bytes.
pub fn sign_bytes(account: &Account, payload: &[u8]) -> Result<Record, CryptoError> {
    let prehash = eth_message_hash(&keccak256(payload));
    let signature = account.keypair().sign_prehash(&prehash)?;
    Ok(Record {
        payload: payload.to_vec(),
        signer: account.address(),
        signature,
    })
}

/// Deterministic signature over the canonical encoding of `payload`.
pub fn sign_record(account: &Account, payload: &RecordPayload) -> Result<Record, CryptoError> {
    sign_bytes(account, &payload.encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{generate_accounts, KeySource};

    fn account() -> Account {
        generate_accounts(1, &KeySource::Deterministic { seed: 11 })
            .unwrap()
            .remove(0)
    }

    fn payload(account: &Account) -> RecordPayload {
        RecordPayload::new(4, account.address(), 0, keccak256(b"data"))
    }

    #[test]
    fn test_sign_then_verify() {
        let account = account();
        let record = sign_record(&account, &payload(&account)).unwrap();
        assert!(record.verify_local());
        assert_eq!(record.signer, account.address());
        assert_eq!(record.decode_payload().unwrap(), payload(&account));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let account = account();
        let a = sign_record(&account, &payload(&account)).unwrap();
        let b = sign_record(&account, &payload(&account)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tampered_payload_fails() {
        let account = account();
        let mut record = sign_record(&account, &payload(&account)).unwrap();
        record.payload[100] ^= 0x01;
        assert!(!record.verify_local());
    }

    #[test]
    fn test_wrong_signer_fails() {
        let accounts = generate_accounts(2, &KeySource::Deterministic { seed: 3 }).unwrap();
        let mut record = sign_record(&accounts[0], &payload(&accounts[0])).unwrap();
        record.signer = accounts[1].address();
        assert!(!record.verify_local());
    }

    #[test]
    fn test_malformed_signature_verifies_false() {
        let account = account();
        let mut record = sign_record(&account, &payload(&account)).unwrap();
        let mut bytes = *record.signature.as_bytes();
        bytes[64] = 0;
        bytes[..32].copy_from_slice(&[0u8; 32]);
        record.signature = Signature::from_bytes(bytes);
        assert!(!record.verify_local());
    }

    #[test]
    fn test_serde_roundtrip() {
        let account = account();
        let record = sign_record(&account, &payload(&account)).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let decoded: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, record);
    }
}
