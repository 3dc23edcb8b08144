//! Atomic mint-and-sell transactions.
//!
//! One transaction creates a fresh collectible mint, mints its single unit
//! to the buyer, permanently revokes the mint authority, attaches metadata
//! and collects payment. The ledger commits it all or nothing. The buyer
//! pays fees; treasury and the new mint keypair sign here and the buyer
//! signs last in their own wallet.

mod guard;
pub use guard::*;

mod signatures;
pub use signatures::*;

mod token_program;
pub use token_program::*;

use log::{debug, info};
use solana_sdk::{
    instruction::Instruction,
    message::Message,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account,
};
use spl_token::instruction::AuthorityType;
use thiserror::Error;

use crate::{
    constants::{
        COLLECTIBLE_DECIMALS, COLLECTIBLE_SUPPLY, MAX_NAME_LENGTH, MINT_SALE_INSTRUCTION_COUNT,
        TOKEN_METADATA_PROGRAM_ID,
    },
    domain::{
        encoding::truncate_to_byte_limit,
        metadata::{
            create_metadata_instruction, find_metadata_address, validate_metadata_record,
            CreateMetadataAccounts, MetadataInstructionError,
        },
        transfer_policy::{TransferPolicy, TransferPolicyError},
    },
    models::{
        EncodedSerializedTransaction, LedgerError, MetadataRecord, MintSaleResult,
        ProductDescriptor, TransactionEncodingError,
    },
    services::{SolanaProviderError, SolanaProviderTrait},
    utils::{format_token_amount, resolve_metadata_uri, to_raw_token_amount},
};

#[derive(Error, Debug)]
pub enum MintSaleError {
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error("Buyer {0} cannot be the treasury")]
    BuyerIsTreasury(Pubkey),

    #[error("Price {price} with {decimals} decimals overflows a token amount")]
    PriceOverflow { price: u64, decimals: u8 },

    #[error("Payment mint {0} does not exist")]
    PaymentMintNotFound(Pubkey),

    #[error("Payment mint is owned by unsupported program {0}")]
    UnsupportedTokenProgram(Pubkey),

    #[error("Invalid payment mint: {0}")]
    InvalidPaymentMint(String),

    #[error("Failed to build instruction: {0}")]
    Instruction(String),

    #[error("Failed to sign transaction: {0}")]
    Signing(String),

    #[error("Invalid sale transaction: {0}")]
    InvalidTransaction(String),

    #[error("Transaction is missing signatures from: {0:?}")]
    MissingSignatures(Vec<Pubkey>),

    #[error("A broadcast for mint {0} is already in flight")]
    SubmissionInFlight(Pubkey),

    #[error(transparent)]
    Metadata(#[from] MetadataInstructionError),

    #[error(transparent)]
    TransferPolicy(#[from] TransferPolicyError),

    #[error(transparent)]
    Encoding(#[from] TransactionEncodingError),

    #[error(transparent)]
    Provider(#[from] SolanaProviderError),
}

impl From<MintSaleError> for LedgerError {
    fn from(err: MintSaleError) -> Self {
        match err {
            MintSaleError::Provider(e) => LedgerError::from(e),
            MintSaleError::TransferPolicy(e) => LedgerError::from(e),
            MintSaleError::SubmissionInFlight(_) => LedgerError::LedgerRejected(err.to_string()),
            other => LedgerError::InputRejected(other.to_string()),
        }
    }
}

/// Marketplace settings the builder needs besides the treasury key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintSaleSettings {
    pub payment_mint: Pubkey,
    pub metadata_base_url: String,
    pub collection_symbol: String,
}

/// Everything needed to lay out the seven sale instructions.
#[derive(Debug, Clone, Copy)]
pub struct MintSaleAccounts {
    pub buyer: Pubkey,
    pub treasury: Pubkey,
    pub mint: Pubkey,
    pub mint_rent_lamports: u64,
    pub payment_mint: PaymentMint,
    pub payment_amount: u64,
}

/// Lays out the sale instructions in commit order:
///
/// 1. create the mint account, funded by the buyer
/// 2. initialize it with 0 decimals, treasury as mint and freeze authority
/// 3. create the buyer's associated account for the mint
/// 4. mint one unit to it
/// 5. revoke the mint authority
/// 6. create metadata, paid by the buyer
/// 7. transfer the price from buyer to treasury
pub fn mint_sale_instructions(
    accounts: &MintSaleAccounts,
    record: &MetadataRecord,
) -> Result<Vec<Instruction>, MintSaleError> {
    let token_program = spl_token::id();
    let MintSaleAccounts {
        buyer,
        treasury,
        mint,
        ..
    } = *accounts;

    let buyer_collectible_account =
        get_associated_token_address_with_program_id(&buyer, &mint, &token_program);
    let payment = accounts.payment_mint;
    let buyer_payment_account = payment
        .program
        .associated_token_address(&buyer, &payment.address);
    let treasury_payment_account = payment
        .program
        .associated_token_address(&treasury, &payment.address);

    let build_error = |e: solana_sdk::program_error::ProgramError| {
        MintSaleError::Instruction(e.to_string())
    };

    let instructions = vec![
        solana_system_interface::instruction::create_account(
            &buyer,
            &mint,
            accounts.mint_rent_lamports,
            spl_token::state::Mint::LEN as u64,
            &token_program,
        ),
        spl_token::instruction::initialize_mint2(
            &token_program,
            &mint,
            &treasury,
            Some(&treasury),
            COLLECTIBLE_DECIMALS,
        )
        .map_err(build_error)?,
        create_associated_token_account(&buyer, &buyer, &mint, &token_program),
        spl_token::instruction::mint_to(
            &token_program,
            &mint,
            &buyer_collectible_account,
            &treasury,
            &[],
            COLLECTIBLE_SUPPLY,
        )
        .map_err(build_error)?,
        spl_token::instruction::set_authority(
            &token_program,
            &mint,
            None,
            AuthorityType::MintTokens,
            &treasury,
            &[],
        )
        .map_err(build_error)?,
        create_metadata_instruction(
            &CreateMetadataAccounts {
                metadata: find_metadata_address(&mint),
                mint,
                mint_authority: treasury,
                payer: buyer,
                update_authority: treasury,
            },
            record,
        )?,
        payment.program.transfer_checked_instruction(
            &buyer_payment_account,
            &payment.address,
            &treasury_payment_account,
            &buyer,
            accounts.payment_amount,
            payment.decimals,
        )?,
    ];

    debug_assert_eq!(instructions.len(), MINT_SALE_INSTRUCTION_COUNT);
    Ok(instructions)
}

/// Builds and submits mint-and-sell transactions for one treasury.
pub struct MintSaleService<P>
where
    P: SolanaProviderTrait,
{
    provider: P,
    treasury: Keypair,
    settings: MintSaleSettings,
    transfer_policy: Option<TransferPolicy>,
    guard: SubmissionGuard,
}

impl<P> MintSaleService<P>
where
    P: SolanaProviderTrait,
{
    pub fn new(provider: P, treasury: Keypair, settings: MintSaleSettings) -> Self {
        Self {
            provider,
            treasury,
            settings,
            transfer_policy: None,
            guard: SubmissionGuard::new(),
        }
    }

    /// Applies `policy` to the buyer's payment transfer.
    pub fn with_transfer_policy(mut self, policy: Option<TransferPolicy>) -> Self {
        self.transfer_policy = policy;
        self
    }

    pub fn treasury(&self) -> Pubkey {
        self.treasury.pubkey()
    }

    pub fn submission_guard(&self) -> &SubmissionGuard {
        &self.guard
    }

    fn collectible_record(&self, product: &ProductDescriptor) -> Result<MetadataRecord, MintSaleError> {
        let name = truncate_to_byte_limit(product.name.trim(), MAX_NAME_LENGTH);
        if name.is_empty() {
            return Err(MintSaleError::InvalidProduct("name is empty".to_string()));
        }
        if product.uri.trim().is_empty() {
            return Err(MintSaleError::InvalidProduct("uri is empty".to_string()));
        }

        let uri = resolve_metadata_uri(&self.settings.metadata_base_url, &product.uri);
        let record = MetadataRecord::collectible(
            name,
            self.settings.collection_symbol.as_str(),
            uri,
            self.treasury.pubkey(),
        );
        validate_metadata_record(&record)?;
        Ok(record)
    }

    /// Builds a sale transaction signed by treasury and a fresh mint key.
    ///
    /// Inputs are validated before the ledger is read. The returned
    /// transaction still needs the buyer's signature; nothing may be added
    /// to it afterwards.
    pub async fn build_mint_sale(
        &self,
        buyer: &Pubkey,
        product: &ProductDescriptor,
    ) -> Result<MintSaleResult, LedgerError> {
        Ok(self.build(buyer, product).await?)
    }

    async fn build(
        &self,
        buyer: &Pubkey,
        product: &ProductDescriptor,
    ) -> Result<MintSaleResult, MintSaleError> {
        let treasury = self.treasury.pubkey();
        if *buyer == treasury {
            return Err(MintSaleError::BuyerIsTreasury(*buyer));
        }
        let record = self.collectible_record(product)?;
        if let Some(policy) = &self.transfer_policy {
            policy.enforce(buyer, &treasury)?;
        }

        // Independent reads; none depends on another's result.
        let (payment_mint, mint_rent_lamports, recent_blockhash) = tokio::try_join!(
            probe_payment_mint(&self.provider, &self.settings.payment_mint),
            async {
                self.provider
                    .get_minimum_balance_for_rent_exemption(spl_token::state::Mint::LEN)
                    .await
                    .map_err(MintSaleError::from)
            },
            async {
                self.provider
                    .get_latest_blockhash()
                    .await
                    .map_err(MintSaleError::from)
            },
        )?;
        let payment_amount = to_raw_token_amount(product.price, payment_mint.decimals).ok_or(
            MintSaleError::PriceOverflow {
                price: product.price,
                decimals: payment_mint.decimals,
            },
        )?;

        let mint = Keypair::new();
        let accounts = MintSaleAccounts {
            buyer: *buyer,
            treasury,
            mint: mint.pubkey(),
            mint_rent_lamports,
            payment_mint,
            payment_amount,
        };
        let instructions = mint_sale_instructions(&accounts, &record)?;

        let message = Message::new_with_blockhash(&instructions, Some(buyer), &recent_blockhash);
        let mut transaction = Transaction::new_unsigned(message);
        transaction
            .try_partial_sign(&[&self.treasury, &mint], recent_blockhash)
            .map_err(|e| MintSaleError::Signing(e.to_string()))?;

        info!(
            "Built sale of mint {} to {} for {} of {}",
            accounts.mint,
            buyer,
            format_token_amount(payment_amount, payment_mint.decimals),
            payment_mint.address
        );

        Ok(MintSaleResult {
            transaction: EncodedSerializedTransaction::try_from(&transaction)?,
            mint: accounts.mint,
            metadata_address: find_metadata_address(&accounts.mint),
            metadata_uri: record.uri,
            payment_amount,
        })
    }

    /// Broadcasts a buyer-completed sale once.
    ///
    /// Every required signature must be present and valid. Only one
    /// broadcast per mint may be in flight; a refused broadcast is final
    /// and the sale has to be rebuilt.
    pub async fn submit_signed_sale(
        &self,
        encoded: EncodedSerializedTransaction,
    ) -> Result<Signature, LedgerError> {
        let transaction = Transaction::try_from(encoded).map_err(MintSaleError::from)?;
        let mint = sale_mint(&transaction)?;

        let missing = missing_signers(&transaction);
        if !missing.is_empty() {
            return Err(MintSaleError::MissingSignatures(missing).into());
        }
        transaction
            .verify()
            .map_err(|e| MintSaleError::InvalidTransaction(e.to_string()))?;

        let _permit = self.guard.try_acquire(mint)?;
        debug!("Broadcasting sale of mint {}", mint);

        let signature = self
            .provider
            .send_transaction(&transaction)
            .await
            .map_err(SolanaProviderError::into_submission_error)?;

        info!("Broadcast sale of mint {} as {}", mint, signature);
        Ok(signature)
    }
}

/// Programs the first six sale instructions must target, in order.
fn sale_program_sequence() -> [Pubkey; MINT_SALE_INSTRUCTION_COUNT - 1] {
    [
        solana_system_interface::program::ID,
        spl_token::id(),
        spl_associated_token_account::id(),
        spl_token::id(),
        spl_token::id(),
        TOKEN_METADATA_PROGRAM_ID,
    ]
}

/// The collectible mint of a sale transaction: first account of the
/// mint-initialization instruction.
///
/// Fails unless the transaction has the sale's shape: seven instructions
/// targeting the sale programs in order, the last one a payment through
/// either token program.
fn sale_mint(transaction: &Transaction) -> Result<Pubkey, MintSaleError> {
    let message = &transaction.message;
    if message.instructions.len() != MINT_SALE_INSTRUCTION_COUNT {
        return Err(MintSaleError::InvalidTransaction(format!(
            "expected {} instructions, found {}",
            MINT_SALE_INSTRUCTION_COUNT,
            message.instructions.len()
        )));
    }

    let programs = message
        .instructions
        .iter()
        .map(|ix| {
            message
                .account_keys
                .get(usize::from(ix.program_id_index))
                .copied()
                .ok_or_else(|| {
                    MintSaleError::InvalidTransaction("program id index out of range".to_string())
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let expected_programs = sale_program_sequence();
    for (position, (actual, expected)) in programs.iter().zip(expected_programs).enumerate() {
        if *actual != expected {
            return Err(MintSaleError::InvalidTransaction(format!(
                "instruction {} targets {}, expected {}",
                position + 1,
                actual,
                expected
            )));
        }
    }
    let payment_program = programs[MINT_SALE_INSTRUCTION_COUNT - 1];
    PaymentTokenProgram::from_owner(&payment_program).map_err(|_| {
        MintSaleError::InvalidTransaction(format!(
            "payment instruction targets {payment_program}, expected a token program"
        ))
    })?;
    message.instructions[1]
        .accounts
        .first()
        .and_then(|index| message.account_keys.get(usize::from(*index)))
        .copied()
        .ok_or_else(|| MintSaleError::InvalidTransaction("mint account missing".to_string()))
}
