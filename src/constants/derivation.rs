//! Constants for recovery-phrase key derivation.

/// HMAC key used to derive the ed25519 master key from a seed.
pub const ED25519_CURVE_SEED: &[u8] = b"ed25519 seed";

/// Offset added to an index to mark it hardened.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Registered coin type for Solana.
pub const SOLANA_COIN_TYPE: u32 = 501;

/// Length of an ed25519 seed / secret key.
pub const ED25519_SEED_LENGTH: usize = 32;

/// Fixed derivation paths tried during recovery, in report order.
pub const RECOVERY_DERIVATION_PATHS: &[&str] = &[
    "m/44'/501'",
    "m/44'/501'/0'",
    "m/44'/501'/0'/0'",
    "m/44'/501'/1'/0'",
    "m/44'/501'/2'/0'",
];

pub const DIRECT_ENTROPY_LABEL: &str = "direct-entropy";
pub const RAW_SEED_LABEL: &str = "raw-seed";
