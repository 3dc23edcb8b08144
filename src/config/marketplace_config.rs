use std::{env, str::FromStr};

use solana_sdk::{pubkey::Pubkey, signature::Keypair};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::{
    constants::{DEFAULT_COLLECTION_SYMBOL, DEFAULT_RPC_TIMEOUT_SECONDS, MAX_SYMBOL_LENGTH},
    domain::{MintSaleSettings, TransferPolicy},
    services::{RetryConfig, SolanaProvider, SolanaProviderError},
    utils::{is_absolute_http_url, load_keypair_from_base58, mask_url, KeypairError},
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingField(String),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("Invalid treasury key: {0}")]
    InvalidTreasuryKey(#[from] KeypairError),
    #[error("Provider error: {0}")]
    Provider(#[from] SolanaProviderError),
}

/// Marketplace settings read from the environment.
#[derive(Clone)]
pub struct MarketplaceConfig {
    pub rpc_url: String,
    pub rpc_timeout_seconds: u64,
    treasury_secret_key: Zeroizing<String>,
    pub payment_token_mint: Pubkey,
    pub metadata_base_url: String,
    pub collection_symbol: String,
    pub transfer_policy: Option<TransferPolicy>,
    pub retry: RetryConfig,
}

impl std::fmt::Debug for MarketplaceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceConfig")
            .field("rpc_url", &mask_url(&self.rpc_url))
            .field("rpc_timeout_seconds", &self.rpc_timeout_seconds)
            .field("payment_token_mint", &self.payment_token_mint)
            .field("metadata_base_url", &self.metadata_base_url)
            .field("collection_symbol", &self.collection_symbol)
            .field("transfer_policy", &self.transfer_policy)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingField(key.to_string())),
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey, ConfigError> {
    Pubkey::from_str(value).map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

impl MarketplaceConfig {
    /// Reads and validates:
    /// - `SOLANA_RPC_URL`, `TREASURY_SECRET_KEY`, `PAYMENT_TOKEN_MINT`,
    ///   `METADATA_BASE_URL` (required)
    /// - `SOLANA_RPC_TIMEOUT_SECONDS` (default 30), `COLLECTION_SYMBOL`
    ///   (default `PRSN`)
    /// - `TRANSFER_RESTRICTED_SENDER` and `TRANSFER_ALLOWED_RECIPIENT`,
    ///   both or neither
    /// - retry settings, see [`RetryConfig::from_env`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let rpc_timeout_seconds = match optional("SOLANA_RPC_TIMEOUT_SECONDS") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                field: "SOLANA_RPC_TIMEOUT_SECONDS".to_string(),
                reason: format!("'{value}' is not a number of seconds"),
            })?,
            None => DEFAULT_RPC_TIMEOUT_SECONDS,
        };

        let transfer_policy = match (
            optional("TRANSFER_RESTRICTED_SENDER"),
            optional("TRANSFER_ALLOWED_RECIPIENT"),
        ) {
            (Some(sender), Some(recipient)) => Some(TransferPolicy::new(
                parse_pubkey("TRANSFER_RESTRICTED_SENDER", &sender)?,
                parse_pubkey("TRANSFER_ALLOWED_RECIPIENT", &recipient)?,
            )),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingField(
                    "TRANSFER_ALLOWED_RECIPIENT".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingField(
                    "TRANSFER_RESTRICTED_SENDER".to_string(),
                ))
            }
        };

        let config = Self {
            rpc_url: required("SOLANA_RPC_URL")?,
            rpc_timeout_seconds,
            treasury_secret_key: Zeroizing::new(required("TREASURY_SECRET_KEY")?),
            payment_token_mint: parse_pubkey("PAYMENT_TOKEN_MINT", &required("PAYMENT_TOKEN_MINT")?)?,
            metadata_base_url: required("METADATA_BASE_URL")?,
            collection_symbol: optional("COLLECTION_SYMBOL")
                .unwrap_or_else(|| DEFAULT_COLLECTION_SYMBOL.to_string()),
            transfer_policy,
            retry: RetryConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_absolute_http_url(&self.rpc_url) {
            return Err(ConfigError::InvalidValue {
                field: "SOLANA_RPC_URL".to_string(),
                reason: "must be an http(s) URL".to_string(),
            });
        }
        if !is_absolute_http_url(&self.metadata_base_url) {
            return Err(ConfigError::InvalidValue {
                field: "METADATA_BASE_URL".to_string(),
                reason: "must be an http(s) URL".to_string(),
            });
        }
        if self.collection_symbol.is_empty() || self.collection_symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(ConfigError::InvalidValue {
                field: "COLLECTION_SYMBOL".to_string(),
                reason: format!("must be 1 to {MAX_SYMBOL_LENGTH} bytes"),
            });
        }
        if self.rpc_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "SOLANA_RPC_TIMEOUT_SECONDS".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        self.treasury_keypair()?;
        Ok(())
    }

    pub fn treasury_keypair(&self) -> Result<Keypair, ConfigError> {
        Ok(load_keypair_from_base58(&self.treasury_secret_key)?)
    }

    pub fn mint_sale_settings(&self) -> MintSaleSettings {
        MintSaleSettings {
            payment_mint: self.payment_token_mint,
            metadata_base_url: self.metadata_base_url.clone(),
            collection_symbol: self.collection_symbol.clone(),
        }
    }

    pub fn solana_provider(&self) -> Result<SolanaProvider, ConfigError> {
        Ok(SolanaProvider::new_with_commitment(
            &self.rpc_url,
            self.rpc_timeout_seconds,
            solana_sdk::commitment_config::CommitmentConfig::confirmed(),
            self.retry.clone(),
        )?)
    }
}
