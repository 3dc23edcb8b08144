//! Retry with exponential backoff for idempotent ledger reads.
//!
//! Every attempt re-issues the same request; only errors the caller
//! classifies as retriable are retried, up to `max_retries` extra attempts.

use log::{debug, warn};
use std::{env, future::Future, time::Duration};

use crate::constants::{
    DEFAULT_PROVIDER_MAX_RETRIES, DEFAULT_PROVIDER_RETRY_BASE_DELAY_MS,
    DEFAULT_PROVIDER_RETRY_MAX_DELAY_MS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Extra attempts after the first failure.
    pub max_retries: u8,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_PROVIDER_MAX_RETRIES,
            base_delay_ms: DEFAULT_PROVIDER_RETRY_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_PROVIDER_RETRY_MAX_DELAY_MS,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u8, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// Reads `PROVIDER_MAX_RETRIES`, `PROVIDER_RETRY_BASE_DELAY_MS` and
    /// `PROVIDER_RETRY_MAX_DELAY_MS`, falling back to defaults for missing or
    /// unparsable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: env_or("PROVIDER_MAX_RETRIES", defaults.max_retries),
            base_delay_ms: env_or("PROVIDER_RETRY_BASE_DELAY_MS", defaults.base_delay_ms),
            max_delay_ms: env_or("PROVIDER_RETRY_MAX_DELAY_MS", defaults.max_delay_ms),
        }
    }

    /// Delay before retry number `attempt` (0-based): base * 2^attempt,
    /// capped at `max_delay_ms`.
    pub fn delay_for_attempt(&self, attempt: u8) -> Duration {
        let factor = 1u64.checked_shl(u32::from(attempt)).unwrap_or(u64::MAX);
        let delay = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Runs `operation` until it succeeds, fails with a non-retriable error, or
/// the retry budget is spent. The last error is returned unchanged.
pub async fn retry_rpc_call<T, E, F, Fut, R>(
    operation_name: &str,
    config: &RetryConfig,
    is_retriable: R,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt: u8 = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("RPC call '{}' succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if is_retriable(&e) && attempt < config.max_retries => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    "RPC call '{}' failed (attempt {}/{}): {}; retrying in {}ms",
                    operation_name,
                    attempt + 1,
                    u16::from(config.max_retries) + 1,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                debug!("RPC call '{}' failed permanently: {}", operation_name, e);
                return Err(e);
            }
        }
    }
}
