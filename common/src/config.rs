use primitive_types::U256;

pub const VERSION: &str = env!("BUILD_VERSION");

// Largest value accepted for any coordinate, radius or bound (2^64 - 1).
// Keeps every squared distance far below 2^256.
pub const MAX_COORDINATE: u64 = u64::MAX;

// Upper limit for a problem's maximum circle count
pub const MAX_CIRCLES: usize = 4096;

// Domain tag for deterministic account key derivation
pub const ACCOUNT_KEY_DOMAIN: &[u8] = b"randao-account";

// Canonical record payload: be32(island) || owner(20) || be32(sequence) || data(32)
pub const RECORD_PAYLOAD_SIZE: usize = 32 + 20 + 32 + 32;

// 1 ETH in wei
pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Default problem shape used by the harness and tests
pub mod defaults {
    pub const MIN_X: u64 = 0;
    pub const MAX_X: u64 = 1000;
    pub const MIN_Y: u64 = 0;
    pub const MAX_Y: u64 = 1000;
    pub const MIN_RADIUS: u64 = 10;
    pub const MAX_RADIUS: u64 = 100;
    pub const MAX_CIRCLES: usize = 8;
    // Candidates tried by one insertion transaction
    pub const ATTEMPTS_PER_TX: u64 = 16;
    // Candidates tried by the local test circle
    pub const TEST_CIRCLE_BUDGET: u64 = 100;
}

#[inline]
pub fn max_coordinate() -> U256 {
    U256::from(MAX_COORDINATE)
}

/// Convert a milli-ether amount (e.g. 80 for 0.08 ETH) to wei.
pub fn milli_ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(WEI_PER_ETHER / 1000)
}
