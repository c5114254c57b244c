/// Cryptographically secure random values
///
/// Keys generated with `KeySource::SecureRandom` and fresh problem seeds
/// come from the operating system's CSPRNG. Test runs that must be
/// reproducible go through a seeded `StdRng` instead.
use primitive_types::U256;
use rand::rngs::OsRng;
use rand::RngCore;

use super::Hash;

/// Generate cryptographically secure random bytes
///
/// # Example
/// ```
/// use randao_common::crypto::random::secure_random_bytes;
///
/// let data = secure_random_bytes::<32>();
/// assert_eq!(data.len(), 32);
/// ```
pub fn secure_random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Random 32-byte value as a Hash
pub fn secure_random_hash() -> Hash {
    Hash::new(secure_random_bytes::<32>())
}

/// Random full-width seed
pub fn secure_random_seed() -> U256 {
    secure_random_hash().to_u256()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_random_bytes() {
        let bytes1 = secure_random_bytes::<32>();
        let bytes2 = secure_random_bytes::<32>();

        // Random bytes should be different each time
        assert_ne!(bytes1, bytes2);
    }

    #[test]
    fn test_secure_random_seed() {
        assert_ne!(secure_random_seed(), secure_random_seed());
    }
}
