//! Payment token program detection.
//!
//! The payment mint may belong to the legacy token program or to Token-2022.
//! The two take different program ids in `transfer_checked` and derive
//! different associated accounts, so the mint's owner is read at build time.

use log::debug;
use solana_sdk::{instruction::Instruction, program_pack::Pack, pubkey::Pubkey};
use spl_associated_token_account::get_associated_token_address_with_program_id;
use spl_token_2022::extension::StateWithExtensions;

use crate::services::SolanaProviderTrait;

use super::MintSaleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentTokenProgram {
    SplToken,
    Token2022,
}

impl PaymentTokenProgram {
    pub fn program_id(&self) -> Pubkey {
        match self {
            PaymentTokenProgram::SplToken => spl_token::id(),
            PaymentTokenProgram::Token2022 => spl_token_2022::id(),
        }
    }

    pub fn from_owner(owner: &Pubkey) -> Result<Self, MintSaleError> {
        if *owner == spl_token::id() {
            Ok(PaymentTokenProgram::SplToken)
        } else if *owner == spl_token_2022::id() {
            Ok(PaymentTokenProgram::Token2022)
        } else {
            Err(MintSaleError::UnsupportedTokenProgram(*owner))
        }
    }

    /// Reads `decimals` from mint account data owned by this program.
    pub fn mint_decimals(&self, data: &[u8]) -> Result<u8, MintSaleError> {
        match self {
            PaymentTokenProgram::SplToken => spl_token::state::Mint::unpack(data)
                .map(|mint| mint.decimals)
                .map_err(|e| MintSaleError::InvalidPaymentMint(e.to_string())),
            PaymentTokenProgram::Token2022 => {
                StateWithExtensions::<spl_token_2022::state::Mint>::unpack(data)
                    .map(|mint| mint.base.decimals)
                    .map_err(|e| MintSaleError::InvalidPaymentMint(e.to_string()))
            }
        }
    }

    pub fn associated_token_address(&self, wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
        get_associated_token_address_with_program_id(wallet, mint, &self.program_id())
    }

    pub fn transfer_checked_instruction(
        &self,
        source: &Pubkey,
        mint: &Pubkey,
        destination: &Pubkey,
        authority: &Pubkey,
        amount: u64,
        decimals: u8,
    ) -> Result<Instruction, MintSaleError> {
        let program_id = self.program_id();
        let instruction = match self {
            PaymentTokenProgram::SplToken => spl_token::instruction::transfer_checked(
                &program_id,
                source,
                mint,
                destination,
                authority,
                &[],
                amount,
                decimals,
            ),
            PaymentTokenProgram::Token2022 => spl_token_2022::instruction::transfer_checked(
                &program_id,
                source,
                mint,
                destination,
                authority,
                &[],
                amount,
                decimals,
            ),
        };
        instruction.map_err(|e| MintSaleError::Instruction(e.to_string()))
    }
}

/// The payment mint as seen on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentMint {
    pub address: Pubkey,
    pub program: PaymentTokenProgram,
    pub decimals: u8,
}

/// Reads the payment mint once and classifies its token program.
pub async fn probe_payment_mint<P: SolanaProviderTrait>(
    provider: &P,
    mint: &Pubkey,
) -> Result<PaymentMint, MintSaleError> {
    let account = provider
        .get_optional_account(mint)
        .await?
        .ok_or(MintSaleError::PaymentMintNotFound(*mint))?;

    let program = PaymentTokenProgram::from_owner(&account.owner)?;
    let decimals = program.mint_decimals(&account.data)?;
    debug!(
        "Payment mint {} uses {:?} with {} decimals",
        mint, program, decimals
    );

    Ok(PaymentMint {
        address: *mint,
        program,
        decimals,
    })
}
