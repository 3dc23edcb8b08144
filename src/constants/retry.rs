//! Defaults for retrying read-only ledger calls.

pub const DEFAULT_PROVIDER_MAX_RETRIES: u8 = 3;
pub const DEFAULT_PROVIDER_RETRY_BASE_DELAY_MS: u64 = 100;
pub const DEFAULT_PROVIDER_RETRY_MAX_DELAY_MS: u64 = 2000;
pub const DEFAULT_RPC_TIMEOUT_SECONDS: u64 = 30;
