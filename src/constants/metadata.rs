//! Constants for the token metadata program.
//!
//! Field budgets are byte lengths of the UTF-8 encoding, matching the limits
//! the on-chain program enforces.

use solana_sdk::{pubkey, pubkey::Pubkey};

/// Token metadata program address.
pub const TOKEN_METADATA_PROGRAM_ID: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// Seed tag prefixed to every metadata account derivation.
pub const METADATA_SEED_PREFIX: &str = "metadata";

pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;
pub const MAX_CREATOR_LIMIT: usize = 5;

/// Creator shares are percentages and must add up to this value.
pub const CREATOR_SHARE_TOTAL: u8 = 100;

/// `CreateMetadataAccountV3` instruction discriminator.
pub const CREATE_METADATA_ACCOUNT_V3_DISCRIMINATOR: u8 = 33;

/// `UpdateMetadataAccountV2` instruction discriminator.
pub const UPDATE_METADATA_ACCOUNT_V2_DISCRIMINATOR: u8 = 15;

/// Symbol used for minted collectibles when none is configured.
pub const DEFAULT_COLLECTION_SYMBOL: &str = "PRSN";
