//! Token metadata instruction builders.
//!
//! Builds the two metadata program instructions the marketplace needs:
//! `CreateMetadataAccountV3` when a collectible is minted and
//! `UpdateMetadataAccountV2` when its description changes. The program
//! reads accounts by position, so account order here is part of the wire
//! contract.

mod pda;
pub use pda::*;

mod service;
pub use service::*;

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    sysvar,
};
use thiserror::Error;

use crate::{
    constants::{
        CREATE_METADATA_ACCOUNT_V3_DISCRIMINATOR, CREATOR_SHARE_TOTAL, MAX_CREATOR_LIMIT,
        MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH, MAX_URI_LENGTH, TOKEN_METADATA_PROGRAM_ID,
        UPDATE_METADATA_ACCOUNT_V2_DISCRIMINATOR,
    },
    domain::encoding::InstructionDataWriter,
    models::{LedgerError, MetadataRecord},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataInstructionError {
    #[error("Metadata {field} is {length} bytes, limit is {max} bytes")]
    FieldTooLong {
        field: &'static str,
        length: usize,
        max: usize,
    },

    #[error("Invalid creators: {0}")]
    InvalidCreators(String),
}

impl From<MetadataInstructionError> for LedgerError {
    fn from(err: MetadataInstructionError) -> Self {
        LedgerError::InputRejected(err.to_string())
    }
}

/// Accounts for `CreateMetadataAccountV3`.
#[derive(Debug, Clone, Copy)]
pub struct CreateMetadataAccounts {
    pub metadata: Pubkey,
    pub mint: Pubkey,
    pub mint_authority: Pubkey,
    pub payer: Pubkey,
    pub update_authority: Pubkey,
}

/// Checks byte budgets and creator shares before anything is encoded.
pub fn validate_metadata_record(record: &MetadataRecord) -> Result<(), MetadataInstructionError> {
    check_field("name", &record.name, MAX_NAME_LENGTH)?;
    check_field("symbol", &record.symbol, MAX_SYMBOL_LENGTH)?;
    check_field("uri", &record.uri, MAX_URI_LENGTH)?;

    if let Some(creators) = &record.creators {
        if creators.is_empty() {
            return Err(MetadataInstructionError::InvalidCreators(
                "creator list must not be empty when present".to_string(),
            ));
        }
        if creators.len() > MAX_CREATOR_LIMIT {
            return Err(MetadataInstructionError::InvalidCreators(format!(
                "{} creators exceeds the limit of {}",
                creators.len(),
                MAX_CREATOR_LIMIT
            )));
        }
        let total: u32 = creators.iter().map(|c| u32::from(c.share)).sum();
        if total != u32::from(CREATOR_SHARE_TOTAL) {
            return Err(MetadataInstructionError::InvalidCreators(format!(
                "creator shares sum to {total}, expected {CREATOR_SHARE_TOTAL}"
            )));
        }
    }

    Ok(())
}

fn check_field(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), MetadataInstructionError> {
    if value.len() > max {
        return Err(MetadataInstructionError::FieldTooLong {
            field,
            length: value.len(),
            max,
        });
    }
    Ok(())
}

/// Builds `CreateMetadataAccountV3` for a freshly minted collectible.
///
/// The record is always created mutable and without collection details.
pub fn create_metadata_instruction(
    accounts: &CreateMetadataAccounts,
    record: &MetadataRecord,
) -> Result<Instruction, MetadataInstructionError> {
    validate_metadata_record(record)?;

    let mut writer = InstructionDataWriter::with_capacity(encoded_len_hint(record) + 3);
    writer
        .write_u8(CREATE_METADATA_ACCOUNT_V3_DISCRIMINATOR)
        .write(record)
        // is_mutable
        .write_bool(true)
        // collection_details
        .write_u8(0);

    Ok(Instruction {
        program_id: TOKEN_METADATA_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(accounts.metadata, false),
            AccountMeta::new_readonly(accounts.mint, false),
            AccountMeta::new_readonly(accounts.mint_authority, true),
            AccountMeta::new(accounts.payer, true),
            AccountMeta::new_readonly(accounts.update_authority, false),
            AccountMeta::new_readonly(solana_system_interface::program::ID, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
        ],
        data: writer.into_bytes(),
    })
}

/// Builds `UpdateMetadataAccountV2` replacing the record of an existing
/// metadata account.
///
/// The update authority and primary-sale flag are left unchanged; the
/// record stays mutable.
pub fn update_metadata_instruction(
    metadata: &Pubkey,
    update_authority: &Pubkey,
    record: &MetadataRecord,
) -> Result<Instruction, MetadataInstructionError> {
    validate_metadata_record(record)?;

    let mut writer = InstructionDataWriter::with_capacity(encoded_len_hint(record) + 6);
    writer
        .write_u8(UPDATE_METADATA_ACCOUNT_V2_DISCRIMINATOR)
        .write_option(Some(record))
        .write_option(None::<&Pubkey>)
        .write_option(None::<&bool>)
        .write_option(Some(&true));

    Ok(Instruction {
        program_id: TOKEN_METADATA_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*metadata, false),
            AccountMeta::new_readonly(*update_authority, true),
        ],
        data: writer.into_bytes(),
    })
}

fn encoded_len_hint(record: &MetadataRecord) -> usize {
    let creators = record.creators.as_ref().map_or(0, |c| 4 + c.len() * 34);
    12 + record.name.len() + record.symbol.len() + record.uri.len() + 2 + 1 + creators + 2
}
