//! Solana Provider Module
//!
//! Thin abstraction over the non-blocking Solana `RpcClient` covering the few
//! ledger calls the marketplace makes: account lookups (metadata existence,
//! payment mint probe), rent exemption, the latest blockhash, and
//! broadcasting a fully signed transaction.
//!
//! Reads go through [`retry_rpc_call`] with exponential backoff and are only
//! retried when [`SolanaProviderError::is_transient`] says so. Broadcasts are
//! sent once; a rejected transaction must be rebuilt, not resent.
use async_trait::async_trait;
use log::debug;
#[cfg(test)]
use mockall::automock;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

use crate::{models::LedgerError, utils::mask_url};

use super::{retry_rpc_call, RetryConfig};

/// Matches `pattern` against `error_msg` ignoring case and spaces.
fn matches_error_pattern(error_msg: &str, pattern: &str) -> bool {
    let normalized_msg = error_msg.to_lowercase().replace(' ', "");
    let normalized_pattern = pattern.to_lowercase().replace(' ', "");
    normalized_msg.contains(&normalized_pattern)
}

/// Errors that can occur when interacting with the Solana provider.
///
/// Use `is_transient()` to determine if an error should be retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolanaProviderError {
    /// Network/IO error (transient - connection issues, timeouts)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// RPC protocol error (transient - node lag, sync pending)
    #[error("RPC error: {0}")]
    RpcError(String),

    /// HTTP request error with status code (transient/permanent based on status code)
    #[error("Request error (HTTP {status_code}): {error}")]
    RequestError { error: String, status_code: u16 },

    /// Invalid address format (permanent)
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Network configuration error (permanent)
    #[error("Network configuration error: {0}")]
    NetworkConfiguration(String),

    /// Insufficient funds for transaction (permanent)
    #[error("Insufficient funds for transaction: {0}")]
    InsufficientFunds(String),

    /// Blockhash not found or expired
    #[error("Blockhash not found or expired: {0}")]
    BlockhashNotFound(String),

    /// Invalid transaction structure or execution (permanent)
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Transaction already processed (permanent - duplicate)
    #[error("Transaction already processed: {0}")]
    AlreadyProcessed(String),
}

impl SolanaProviderError {
    /// Determines if this error is transient (can retry) or permanent (should fail).
    ///
    /// **Transient:** `NetworkError`, `RpcError`, `BlockhashNotFound`, and
    /// `RequestError` with a retriable status (5xx except 501/505, 408, 425, 429).
    ///
    /// **Permanent:** everything else.
    pub fn is_transient(&self) -> bool {
        match self {
            SolanaProviderError::NetworkError(_) => true,
            SolanaProviderError::RpcError(_) => true,
            SolanaProviderError::BlockhashNotFound(_) => true,

            SolanaProviderError::RequestError { status_code, .. } => match *status_code {
                501 | 505 => false,
                500 | 502..=504 | 506..=599 => true,
                408 | 425 | 429 => true,
                _ => false,
            },

            SolanaProviderError::InsufficientFunds(_) => false,
            SolanaProviderError::InvalidTransaction(_) => false,
            SolanaProviderError::AlreadyProcessed(_) => false,
            SolanaProviderError::InvalidAddress(_) => false,
            SolanaProviderError::NetworkConfiguration(_) => false,
        }
    }

    /// Classifies a Solana RPC client error into the appropriate error variant.
    pub fn from_rpc_error(error: ClientError) -> Self {
        match error.kind() {
            ClientErrorKind::Io(_) => SolanaProviderError::NetworkError(error.to_string()),

            ClientErrorKind::Reqwest(reqwest_err) => match reqwest_err.status() {
                Some(status) => SolanaProviderError::RequestError {
                    error: error.to_string(),
                    status_code: status.as_u16(),
                },
                // No status code (connection refused, timeout)
                None => SolanaProviderError::NetworkError(error.to_string()),
            },

            ClientErrorKind::RpcError(rpc_err) => {
                let rpc_err_str = format!("{rpc_err}");
                Self::from_rpc_response_error(&rpc_err_str, &error)
            }

            ClientErrorKind::TransactionError(tx_error) => {
                Self::from_transaction_error(tx_error, &error)
            }

            ClientErrorKind::Custom(msg) => Self::from_rpc_response_error(msg, &error),

            _ => SolanaProviderError::RpcError(error.to_string()),
        }
    }

    /// Classifies RPC response errors using JSON-RPC error codes and messages.
    ///
    /// Transient: -32004, -32005, -32014, -32016 (node lag, pending sync),
    /// -32008 (blockhash not found).
    /// Permanent: -32002 (simulation failure, refined by message), -32003,
    /// -32007, -32009, -32010, -32013, -32015, -32602.
    fn from_rpc_response_error(rpc_err: &str, full_error: &ClientError) -> Self {
        let message = full_error.to_string();
        if rpc_err.contains("-32002") {
            if matches_error_pattern(rpc_err, "blockhash not found") {
                SolanaProviderError::BlockhashNotFound(message)
            } else if matches_error_pattern(rpc_err, "insufficient funds") {
                SolanaProviderError::InsufficientFunds(message)
            } else {
                SolanaProviderError::InvalidTransaction(message)
            }
        } else if rpc_err.contains("-32004")
            || rpc_err.contains("-32005")
            || rpc_err.contains("-32014")
            || rpc_err.contains("-32016")
        {
            SolanaProviderError::RpcError(message)
        } else if rpc_err.contains("-32007") || rpc_err.contains("-32010") {
            SolanaProviderError::NetworkConfiguration(message)
        } else if rpc_err.contains("-32008") {
            SolanaProviderError::BlockhashNotFound(message)
        } else if rpc_err.contains("-32009") {
            SolanaProviderError::AlreadyProcessed(message)
        } else if rpc_err.contains("-32003")
            || rpc_err.contains("-32013")
            || rpc_err.contains("-32015")
            || rpc_err.contains("-32602")
        {
            SolanaProviderError::InvalidTransaction(message)
        } else if matches_error_pattern(rpc_err, "insufficient funds") {
            SolanaProviderError::InsufficientFunds(message)
        } else if matches_error_pattern(rpc_err, "blockhash not found") {
            SolanaProviderError::BlockhashNotFound(message)
        } else if matches_error_pattern(rpc_err, "already processed") {
            SolanaProviderError::AlreadyProcessed(message)
        } else {
            SolanaProviderError::RpcError(message)
        }
    }

    fn from_transaction_error(
        tx_error: &solana_sdk::transaction::TransactionError,
        full_error: &ClientError,
    ) -> Self {
        use solana_sdk::transaction::TransactionError as TxErr;

        let message = full_error.to_string();
        match tx_error {
            TxErr::InsufficientFundsForFee | TxErr::InsufficientFundsForRent { .. } => {
                SolanaProviderError::InsufficientFunds(message)
            }
            TxErr::BlockhashNotFound => SolanaProviderError::BlockhashNotFound(message),
            TxErr::AlreadyProcessed => SolanaProviderError::AlreadyProcessed(message),
            TxErr::SignatureFailure
            | TxErr::MissingSignatureForFee
            | TxErr::InvalidAccountForFee
            | TxErr::AccountNotFound
            | TxErr::InvalidAccountIndex
            | TxErr::ProgramAccountNotFound
            | TxErr::InstructionError(_, _)
            | TxErr::InvalidWritableAccount => SolanaProviderError::InvalidTransaction(message),
            TxErr::AccountInUse | TxErr::AccountLoadedTwice | TxErr::ClusterMaintenance => {
                SolanaProviderError::RpcError(message)
            }
            _ => SolanaProviderError::RpcError(message),
        }
    }

    /// Maps a failed broadcast to the crate taxonomy. A stale blockhash is a
    /// rejection here: the caller has to rebuild with a fresh one.
    pub fn into_submission_error(self) -> LedgerError {
        match self {
            SolanaProviderError::BlockhashNotFound(msg) => LedgerError::LedgerRejected(msg),
            other => LedgerError::from(other),
        }
    }
}

impl From<SolanaProviderError> for LedgerError {
    fn from(err: SolanaProviderError) -> Self {
        match err {
            SolanaProviderError::InvalidAddress(_) => LedgerError::InputRejected(err.to_string()),
            e if e.is_transient() => LedgerError::NetworkTransient(e.to_string()),
            e => LedgerError::LedgerRejected(e.to_string()),
        }
    }
}

/// A trait that abstracts the Solana provider operations the marketplace uses.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait SolanaProviderTrait: Send + Sync {
    /// Retrieves the latest blockhash.
    async fn get_latest_blockhash(&self) -> Result<Hash, SolanaProviderError>;

    /// Retrieves the minimum balance required for rent exemption for the specified data size.
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_size: usize,
    ) -> Result<u64, SolanaProviderError>;

    /// Retrieves an account, or `None` when it does not exist.
    async fn get_optional_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, SolanaProviderError>;

    /// Broadcasts a fully signed transaction once, without retries.
    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaProviderError>;
}

pub struct SolanaProvider {
    client: Arc<RpcClient>,
    timeout: Duration,
    commitment: CommitmentConfig,
    retry_config: RetryConfig,
}

impl std::fmt::Debug for SolanaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaProvider")
            .field("url", &mask_url(&self.client.url()))
            .field("timeout", &self.timeout)
            .field("commitment", &self.commitment)
            .field("retry_config", &self.retry_config)
            .finish()
    }
}

impl SolanaProvider {
    pub fn new(url: &str, timeout_seconds: u64) -> Result<Self, SolanaProviderError> {
        Self::new_with_commitment(
            url,
            timeout_seconds,
            CommitmentConfig::confirmed(),
            RetryConfig::from_env(),
        )
    }

    /// Creates a provider for a single RPC endpoint.
    ///
    /// The URL is validated up front so a typo surfaces as a configuration
    /// error instead of a stream of network failures.
    pub fn new_with_commitment(
        url: &str,
        timeout_seconds: u64,
        commitment: CommitmentConfig,
        retry_config: RetryConfig,
    ) -> Result<Self, SolanaProviderError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SolanaProviderError::NetworkConfiguration(format!(
                "Invalid RPC URL: {url}"
            )));
        }

        debug!("Creating Solana provider for {}", mask_url(url));
        let timeout = Duration::from_secs(timeout_seconds);
        let client =
            RpcClient::new_with_timeout_and_commitment(url.to_string(), timeout, commitment);

        Ok(Self {
            client: Arc::new(client),
            timeout,
            commitment,
            retry_config,
        })
    }

    async fn retry_rpc_call<T, F, Fut>(
        &self,
        operation_name: &str,
        operation: F,
    ) -> Result<T, SolanaProviderError>
    where
        F: Fn(Arc<RpcClient>) -> Fut,
        Fut: std::future::Future<Output = Result<T, SolanaProviderError>>,
    {
        debug!(
            "Starting RPC operation '{}' with timeout: {}s",
            operation_name,
            self.timeout.as_secs()
        );

        retry_rpc_call(
            operation_name,
            &self.retry_config,
            SolanaProviderError::is_transient,
            || operation(Arc::clone(&self.client)),
        )
        .await
    }
}

#[async_trait]
impl SolanaProviderTrait for SolanaProvider {
    async fn get_latest_blockhash(&self) -> Result<Hash, SolanaProviderError> {
        self.retry_rpc_call("get_latest_blockhash", |client| async move {
            client
                .get_latest_blockhash()
                .await
                .map_err(SolanaProviderError::from_rpc_error)
        })
        .await
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_size: usize,
    ) -> Result<u64, SolanaProviderError> {
        self.retry_rpc_call(
            "get_minimum_balance_for_rent_exemption",
            |client| async move {
                client
                    .get_minimum_balance_for_rent_exemption(data_size)
                    .await
                    .map_err(SolanaProviderError::from_rpc_error)
            },
        )
        .await
    }

    async fn get_optional_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, SolanaProviderError> {
        let commitment = self.commitment;
        self.retry_rpc_call("get_account_with_commitment", |client| async move {
            client
                .get_account_with_commitment(pubkey, commitment)
                .await
                .map(|response| response.value)
                .map_err(SolanaProviderError::from_rpc_error)
        })
        .await
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaProviderError> {
        self.client
            .send_transaction(transaction)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }
}
