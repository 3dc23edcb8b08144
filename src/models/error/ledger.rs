use serde::Serialize;
use thiserror::Error;

/// Crate-level error taxonomy.
///
/// Component errors convert into one of these categories so callers can
/// decide what to do next without knowing which component failed:
///
/// - `InputRejected`: malformed phrase, oversized metadata field, bad
///   address. Raised before any encoding or derivation work.
/// - `NetworkTransient`: a ledger read timed out or was rate limited and the
///   retry budget ran out. Safe to retry with the same parameters.
/// - `LedgerRejected`: the network refused a submitted transaction. The
///   caller must rebuild with a fresh blockhash instead of resubmitting.
/// - `AuthorityViolation`: an application-initiated transfer was denied by
///   the transfer policy.
///
/// A key-derivation candidate that does not match its target is not an
/// error and never appears here.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LedgerError {
    #[error("Input rejected: {0}")]
    InputRejected(String),

    #[error("Transient network error: {0}")]
    NetworkTransient(String),

    #[error("Ledger rejected transaction: {0}")]
    LedgerRejected(String),

    #[error("Transfer from {restricted_sender} is only allowed to {allowed_recipient}, not {recipient}")]
    AuthorityViolation {
        restricted_sender: String,
        allowed_recipient: String,
        recipient: String,
    },
}

impl LedgerError {
    /// Only transient network failures may be retried unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::NetworkTransient(_))
    }
}
