use primitive_types::U256;

/// 32-byte big-endian encoding of a U256 (`abi.encodePacked(uint256)`).
pub fn u256_to_be_bytes(value: &U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = value.byte(31 - i);
    }
    bytes
}

/// Absolute difference of two U256 values.
#[inline]
pub fn abs_diff(a: &U256, b: &U256) -> U256 {
    if a >= b {
        *a - *b
    } else {
        *b - *a
    }
}

/// Format a U256 as a minimal `0x` prefixed hex string.
pub fn u256_to_hex(value: &U256) -> String {
    format!("{:#x}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_be_bytes_layout() {
        let bytes = u256_to_be_bytes(&U256::from(0x0102u64));
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
        assert!(bytes[..30].iter().all(|b| *b == 0));
        assert_eq!(U256::from_big_endian(&bytes), U256::from(0x0102u64));
    }

    #[test]
    fn test_be_bytes_max() {
        assert_eq!(u256_to_be_bytes(&U256::MAX), [0xff; 32]);
    }

    #[test]
    fn test_abs_diff_is_symmetric() {
        let a = U256::from(10u64);
        let b = U256::from(250u64);
        assert_eq!(abs_diff(&a, &b), U256::from(240u64));
        assert_eq!(abs_diff(&b, &a), U256::from(240u64));
    }

    #[test]
    fn test_hex_format() {
        assert_eq!(u256_to_hex(&U256::from(255u64)), "0xff");
        assert_eq!(u256_to_hex(&U256::zero()), "0x0");
    }
}
