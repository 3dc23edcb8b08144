//! Builds a mint-and-sell transaction against a live cluster.
//!
//! Reads marketplace settings from the environment (or `.env`), builds the
//! seven-instruction sale for a buyer and prints the partially signed
//! transaction as base64. Handy for checking wallet integrations on devnet.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example build_sale_tx -- <BUYER> --name "Nova" --price 50 --uri nova.json
//! ```
//!
//! With `BUYER_SECRET_KEY` set and `--submit`, the buyer signature is added
//! locally and the sale is broadcast.
use clap::Parser;
use eyre::{eyre, Result};
use persona_mint::{
    config::MarketplaceConfig,
    domain::{complete_buyer_signature, MintSaleService},
    logging::setup_logging,
    models::{EncodedSerializedTransaction, ProductDescriptor},
    utils::load_keypair_from_base58,
};
use solana_sdk::{pubkey::Pubkey, signature::Signer, transaction::Transaction};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(author, version, about = "Build a persona mint-and-sell transaction")]
struct Args {
    /// Buyer wallet address; pays fees and the price
    buyer: String,

    #[arg(long)]
    name: String,

    /// Price in whole payment tokens
    #[arg(long)]
    price: u64,

    /// Metadata URI, absolute or relative to METADATA_BASE_URL
    #[arg(long)]
    uri: String,

    /// Sign with BUYER_SECRET_KEY and broadcast
    #[arg(long)]
    submit: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    setup_logging()?;
    let args = Args::parse();

    let config = MarketplaceConfig::from_env()?;
    let buyer = Pubkey::from_str(&args.buyer)?;
    let service = MintSaleService::new(
        config.solana_provider()?,
        config.treasury_keypair()?,
        config.mint_sale_settings(),
    )
    .with_transfer_policy(config.transfer_policy.clone());

    let product = ProductDescriptor::new(args.name, args.price, args.uri);
    let sale = service
        .build_mint_sale(&buyer, &product)
        .await
        .map_err(|e| eyre!("{}", e))?;

    println!("Mint:           {}", sale.mint);
    println!("Metadata:       {}", sale.metadata_address);
    println!("Metadata URI:   {}", sale.metadata_uri);
    println!("Payment amount: {}", sale.payment_amount);
    println!("Transaction:    {}", sale.transaction.as_str());

    if !args.submit {
        return Ok(());
    }

    let secret = std::env::var("BUYER_SECRET_KEY")
        .map_err(|_| eyre!("BUYER_SECRET_KEY is required with --submit"))?;
    let buyer_keypair = load_keypair_from_base58(&secret)?;
    if buyer_keypair.pubkey() != buyer {
        return Err(eyre!("BUYER_SECRET_KEY does not belong to {}", buyer));
    }

    let transaction = Transaction::try_from(sale.transaction)?;
    let signed = complete_buyer_signature(transaction, &buyer_keypair)?;
    let signature = service
        .submit_signed_sale(EncodedSerializedTransaction::try_from(&signed)?)
        .await
        .map_err(|e| eyre!("{}", e))?;

    println!("Signature:      {}", signature);
    Ok(())
}
