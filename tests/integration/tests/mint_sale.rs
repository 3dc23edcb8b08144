//! Mint-and-sell flow from build to broadcast.

use persona_mint::{
    constants::TOKEN_METADATA_PROGRAM_ID,
    domain::{
        complete_buyer_signature, find_metadata_address, missing_signers, MintSaleService,
        MintSaleSettings, TransferPolicy,
    },
    models::{EncodedSerializedTransaction, LedgerError, ProductDescriptor},
    services::SolanaProviderError,
};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};

use crate::integration::common::{ledger::InMemoryLedger, logging::init_test_logging};

fn settings(payment_mint: Pubkey) -> MintSaleSettings {
    MintSaleSettings {
        payment_mint,
        metadata_base_url: "https://cdn.example.com/personas/".to_string(),
        collection_symbol: "PRSN".to_string(),
    }
}

fn nova() -> ProductDescriptor {
    ProductDescriptor::new("Nova", 50, "nova.json")
}

#[tokio::test]
async fn test_sale_is_built_signed_and_broadcast() {
    init_test_logging();
    let ledger = InMemoryLedger::new();
    let payment_mint = ledger.add_payment_mint(spl_token::id(), 6);
    let treasury = Keypair::new();
    let treasury_pubkey = treasury.pubkey();
    let service = MintSaleService::new(ledger.clone(), treasury, settings(payment_mint));
    let buyer = Keypair::new();

    let sale = service
        .build_mint_sale(&buyer.pubkey(), &nova())
        .await
        .unwrap();

    assert_eq!(sale.payment_amount, 50_000_000);
    assert_eq!(sale.metadata_uri, "https://cdn.example.com/personas/nova.json");
    assert_eq!(sale.metadata_address, find_metadata_address(&sale.mint));

    let transaction = Transaction::try_from(sale.transaction.clone()).unwrap();
    let message = &transaction.message;
    assert_eq!(message.account_keys[0], buyer.pubkey());
    assert_eq!(message.recent_blockhash, ledger.blockhash());

    let programs: Vec<Pubkey> = message
        .instructions
        .iter()
        .map(|ix| *ix.program_id(&message.account_keys))
        .collect();
    assert_eq!(
        programs,
        vec![
            solana_system_interface::program::ID,
            spl_token::id(),
            spl_associated_token_account::id(),
            spl_token::id(),
            spl_token::id(),
            TOKEN_METADATA_PROGRAM_ID,
            spl_token::id(),
        ]
    );

    // Only the buyer is left to sign.
    assert_eq!(missing_signers(&transaction), vec![buyer.pubkey()]);
    assert!(message.account_keys.contains(&treasury_pubkey));
    assert!(message.account_keys.contains(&sale.mint));

    let signed = complete_buyer_signature(transaction, &buyer).unwrap();
    assert!(signed.verify().is_ok());

    let signature = service
        .submit_signed_sale(EncodedSerializedTransaction::try_from(&signed).unwrap())
        .await
        .unwrap();

    let sent = ledger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].signatures[0], signature);
    assert!(!service.submission_guard().is_in_flight(&sale.mint));
}

#[tokio::test]
async fn test_token_2022_payment_mint_is_paid_through_its_program() {
    init_test_logging();
    let ledger = InMemoryLedger::new();
    let payment_mint = ledger.add_payment_mint(spl_token_2022::id(), 2);
    let service = MintSaleService::new(ledger, Keypair::new(), settings(payment_mint));
    let buyer = Pubkey::new_unique();

    let sale = service.build_mint_sale(&buyer, &nova()).await.unwrap();
    assert_eq!(sale.payment_amount, 5_000);

    let transaction = Transaction::try_from(sale.transaction).unwrap();
    let message = &transaction.message;
    let payment = &message.instructions[6];
    assert_eq!(
        *payment.program_id(&message.account_keys),
        spl_token_2022::id()
    );
}

#[tokio::test]
async fn test_buyer_signature_required_before_broadcast() {
    init_test_logging();
    let ledger = InMemoryLedger::new();
    let payment_mint = ledger.add_payment_mint(spl_token::id(), 0);
    let service = MintSaleService::new(ledger.clone(), Keypair::new(), settings(payment_mint));
    let buyer = Pubkey::new_unique();

    let sale = service.build_mint_sale(&buyer, &nova()).await.unwrap();
    let err = service.submit_signed_sale(sale.transaction).await.unwrap_err();

    assert!(matches!(err, LedgerError::InputRejected(_)));
    assert!(ledger.sent().is_empty());
}

#[tokio::test]
async fn test_rejected_broadcast_is_final() {
    init_test_logging();
    let ledger = InMemoryLedger::rejecting(SolanaProviderError::BlockhashNotFound(
        "expired".to_string(),
    ));
    let payment_mint = ledger.add_payment_mint(spl_token::id(), 0);
    let service = MintSaleService::new(ledger, Keypair::new(), settings(payment_mint));
    let buyer = Keypair::new();

    let sale = service
        .build_mint_sale(&buyer.pubkey(), &nova())
        .await
        .unwrap();
    let transaction = Transaction::try_from(sale.transaction).unwrap();
    let signed = complete_buyer_signature(transaction, &buyer).unwrap();

    let err = service
        .submit_signed_sale(EncodedSerializedTransaction::try_from(&signed).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::LedgerRejected(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_transfer_policy_blocks_sale_before_ledger_reads() {
    init_test_logging();
    let ledger = InMemoryLedger::new();
    let payment_mint = ledger.add_payment_mint(spl_token::id(), 6);
    let buyer = Pubkey::new_unique();
    let service = MintSaleService::new(ledger, Keypair::new(), settings(payment_mint))
        .with_transfer_policy(Some(TransferPolicy::new(buyer, Pubkey::new_unique())));

    let err = service.build_mint_sale(&buyer, &nova()).await.unwrap_err();

    assert!(matches!(err, LedgerError::AuthorityViolation { .. }));
}

#[tokio::test]
async fn test_missing_payment_mint_is_rejected() {
    init_test_logging();
    let service = MintSaleService::new(
        InMemoryLedger::new(),
        Keypair::new(),
        settings(Pubkey::new_unique()),
    );

    let err = service
        .build_mint_sale(&Pubkey::new_unique(), &nova())
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InputRejected(_)));
}
