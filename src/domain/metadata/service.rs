//! Chooses between creating and updating metadata for a mint.

use log::{debug, info};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::{
    models::{LedgerError, MetadataRecord},
    services::SolanaProviderTrait,
};

use super::{
    create_metadata_instruction, find_metadata_address, update_metadata_instruction,
    validate_metadata_record, CreateMetadataAccounts,
};

/// Which metadata instruction was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataAction {
    Create,
    Update,
}

#[derive(Debug, Clone)]
pub struct MetadataInstructionPlan {
    pub action: MetadataAction,
    pub metadata: Pubkey,
    pub instruction: Instruction,
}

/// Builds metadata instructions against live ledger state.
pub struct MetadataService<P>
where
    P: SolanaProviderTrait,
{
    provider: P,
}

impl<P> MetadataService<P>
where
    P: SolanaProviderTrait,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Returns a create instruction when `mint` has no metadata account yet,
    /// an update instruction otherwise.
    ///
    /// The record is validated before the ledger is queried. `authority`
    /// acts as mint authority and update authority on create, and must be
    /// the current update authority on update.
    pub async fn metadata_instruction(
        &self,
        mint: &Pubkey,
        authority: &Pubkey,
        payer: &Pubkey,
        record: &MetadataRecord,
    ) -> Result<MetadataInstructionPlan, LedgerError> {
        validate_metadata_record(record)?;

        let metadata = find_metadata_address(mint);
        let existing = self.provider.get_optional_account(&metadata).await?;

        let (action, instruction) = match existing {
            Some(_) => {
                debug!("Metadata {} exists for mint {}, updating", metadata, mint);
                (
                    MetadataAction::Update,
                    update_metadata_instruction(&metadata, authority, record)?,
                )
            }
            None => {
                debug!("No metadata for mint {}, creating {}", mint, metadata);
                let accounts = CreateMetadataAccounts {
                    metadata,
                    mint: *mint,
                    mint_authority: *authority,
                    payer: *payer,
                    update_authority: *authority,
                };
                (
                    MetadataAction::Create,
                    create_metadata_instruction(&accounts, record)?,
                )
            }
        };

        info!("Prepared metadata {:?} for mint {}", action, mint);
        Ok(MetadataInstructionPlan {
            action,
            metadata,
            instruction,
        })
    }
}
