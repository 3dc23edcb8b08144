use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::utils::{deserialize_whole_units, pubkey_string};

use super::EncodedSerializedTransaction;

/// What the buyer is purchasing, as supplied by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    /// Display name; truncated to the metadata name budget when too long.
    pub name: String,
    /// Price in whole units of the payment token.
    #[serde(deserialize_with = "deserialize_whole_units")]
    pub price: u64,
    /// Absolute `http(s)` URI or a path under the metadata base URL.
    pub uri: String,
}

impl ProductDescriptor {
    pub fn new(name: impl Into<String>, price: u64, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            uri: uri.into(),
        }
    }
}

/// A partially signed mint-and-sell transaction awaiting the buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintSaleResult {
    pub transaction: EncodedSerializedTransaction,
    #[serde(with = "pubkey_string")]
    pub mint: Pubkey,
    #[serde(with = "pubkey_string")]
    pub metadata_address: Pubkey,
    pub metadata_uri: String,
    /// Raw payment amount after applying the payment mint's decimals.
    pub payment_amount: u64,
}
