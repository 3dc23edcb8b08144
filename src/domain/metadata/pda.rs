//! Metadata account address derivation.
//!
//! Instruction building and ledger lookups must agree on the metadata
//! account for a mint, so both go through [`find_metadata_address`].

use solana_sdk::pubkey::Pubkey;

use crate::constants::{METADATA_SEED_PREFIX, TOKEN_METADATA_PROGRAM_ID};

/// Derives the program address for `(tag, program_id, mint)`.
///
/// Returns the address and its bump seed. Pure and deterministic.
pub fn derive_metadata_address(tag: &str, program_id: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[tag.as_bytes(), program_id.as_ref(), mint.as_ref()],
        program_id,
    )
}

/// Metadata account the token metadata program uses for `mint`.
pub fn find_metadata_address(mint: &Pubkey) -> Pubkey {
    derive_metadata_address(METADATA_SEED_PREFIX, &TOKEN_METADATA_PROGRAM_ID, mint).0
}
