//! In-memory stand-in for a Solana cluster.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use persona_mint::services::{SolanaProviderError, SolanaProviderTrait};
use solana_sdk::{
    account::Account, hash::Hash, program_option::COption, program_pack::Pack, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};

pub const MINT_RENT_LAMPORTS: u64 = 1_461_600;

#[derive(Clone, Default)]
pub struct InMemoryLedger {
    accounts: Arc<Mutex<HashMap<Pubkey, Account>>>,
    sent: Arc<Mutex<Vec<Transaction>>>,
    blockhash: Hash,
    reject_with: Option<SolanaProviderError>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            blockhash: Hash::new_unique(),
            ..Default::default()
        }
    }

    /// Every broadcast fails with `error`.
    pub fn rejecting(error: SolanaProviderError) -> Self {
        Self {
            reject_with: Some(error),
            ..Self::new()
        }
    }

    pub fn blockhash(&self) -> Hash {
        self.blockhash
    }

    pub fn add_payment_mint(&self, owner: Pubkey, decimals: u8) -> Pubkey {
        let address = Pubkey::new_unique();
        let mint = spl_token::state::Mint {
            mint_authority: COption::Some(Pubkey::new_unique()),
            supply: 1_000_000_000,
            decimals,
            is_initialized: true,
            freeze_authority: COption::None,
        };
        let mut data = vec![0u8; spl_token::state::Mint::LEN];
        spl_token::state::Mint::pack(mint, &mut data).unwrap();
        self.accounts.lock().unwrap().insert(
            address,
            Account {
                lamports: MINT_RENT_LAMPORTS,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
        address
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SolanaProviderTrait for InMemoryLedger {
    async fn get_latest_blockhash(&self) -> Result<Hash, SolanaProviderError> {
        Ok(self.blockhash)
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_size: usize,
    ) -> Result<u64, SolanaProviderError> {
        assert_eq!(data_size, spl_token::state::Mint::LEN);
        Ok(MINT_RENT_LAMPORTS)
    }

    async fn get_optional_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, SolanaProviderError> {
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaProviderError> {
        if let Some(error) = &self.reject_with {
            return Err(error.clone());
        }
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures[0])
    }
}
