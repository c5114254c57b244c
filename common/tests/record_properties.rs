//! Property-based tests for record signing.
//!
//! Properties tested:
//! - verify_local(sign_record(account, payload)) holds for any account/payload
//! - flipping any single payload or signature byte breaks verification

use proptest::prelude::*;
use randao_common::crypto::{Hash, Signature, SIGNATURE_SIZE};
use randao_common::record::{generate_accounts, sign_bytes, sign_record, KeySource, RecordPayload};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_sign_then_verify(
        key_seed in any::<u64>(),
        index in 0usize..4,
        island_id in any::<u64>(),
        sequence in any::<u64>(),
        data in any::<[u8; 32]>(),
    ) {
        let accounts = generate_accounts(index + 1, &KeySource::Deterministic { seed: key_seed }).unwrap();
        let account = &accounts[index];
        let payload = RecordPayload::new(island_id, account.address(), sequence, Hash::new(data));
        let record = sign_record(account, &payload).unwrap();
        prop_assert!(record.verify_local());
        prop_assert_eq!(record.decode_payload().unwrap(), payload);
    }

    #[test]
    fn test_arbitrary_bytes_sign_then_verify(
        key_seed in any::<u64>(),
        payload in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let account = generate_accounts(1, &KeySource::Deterministic { seed: key_seed }).unwrap().remove(0);
        let record = sign_bytes(&account, &payload).unwrap();
        prop_assert!(record.verify_local());
    }

    #[test]
    fn test_payload_tampering_detected(
        key_seed in any::<u64>(),
        data in any::<[u8; 32]>(),
        position in 0usize..116,
        flip in 1u8..=255,
    ) {
        let account = generate_accounts(1, &KeySource::Deterministic { seed: key_seed }).unwrap().remove(0);
        let payload = RecordPayload::new(1, account.address(), 0, Hash::new(data));
        let mut record = sign_record(&account, &payload).unwrap();
        record.payload[position] ^= flip;
        prop_assert!(!record.verify_local());
    }

    #[test]
    fn test_signature_tampering_detected(
        key_seed in any::<u64>(),
        data in any::<[u8; 32]>(),
        position in 0usize..SIGNATURE_SIZE,
        flip in 1u8..=255,
    ) {
        let account = generate_accounts(1, &KeySource::Deterministic { seed: key_seed }).unwrap().remove(0);
        let payload = RecordPayload::new(1, account.address(), 0, Hash::new(data));
        let mut record = sign_record(&account, &payload).unwrap();
        let mut bytes = *record.signature.as_bytes();
        bytes[position] ^= flip;
        record.signature = Signature::from_bytes(bytes);
        prop_assert!(!record.verify_local());
    }
}
