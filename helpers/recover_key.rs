//! Recovery Phrase Key Finder
//!
//! Derives every candidate keypair for a recovery phrase and marks the ones
//! that reproduce an expected address. Use it when a wallet import lands on
//! an unexpected address.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example recover_key -- --target <ADDRESS>
//! ```
//!
//! The phrase is read from `RECOVERY_PHRASE` or, if unset, from stdin so it
//! does not end up in shell history. Private keys are only printed with
//! `--show-secrets`.
use clap::Parser;
use eyre::{eyre, Result};
use persona_mint::domain::recover_keypairs;
use std::io::{self, BufRead};
use zeroize::Zeroizing;

#[derive(Parser, Debug)]
#[command(author, version, about = "Find which derivation scheme produced an address")]
struct Args {
    /// Address the phrase is expected to control
    #[arg(short, long)]
    target: Option<String>,

    /// Optional BIP39 passphrase
    #[arg(short, long, default_value = "")]
    passphrase: String,

    /// Print base58 private keys next to each candidate
    #[arg(long)]
    show_secrets: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn read_phrase() -> Result<Zeroizing<String>> {
    if let Ok(phrase) = std::env::var("RECOVERY_PHRASE") {
        return Ok(Zeroizing::new(phrase));
    }
    eprintln!("Enter recovery phrase:");
    let mut line = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let phrase = read_phrase()?;
    let report = recover_keypairs(&phrase, args.target.as_deref(), &args.passphrase)
        .map_err(|e| eyre!("{}", e))?;

    if args.json {
        let mut value = serde_json::to_value(&report)?;
        if !args.show_secrets {
            if let Some(candidates) = value["candidates"].as_array_mut() {
                for candidate in candidates {
                    candidate["secret_key"] = serde_json::Value::Null;
                }
            }
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for candidate in &report.candidates {
        let marker = if candidate.matches_target { "*" } else { " " };
        if args.show_secrets {
            println!(
                "{} {:<20} {} {}",
                marker,
                candidate.label,
                candidate.address,
                candidate.secret_key.as_str()
            );
        } else {
            println!("{} {:<20} {}", marker, candidate.label, candidate.address);
        }
    }

    if let Some(target) = &report.target {
        match report.matched_labels().as_slice() {
            [] => println!("\nNo candidate matches {}", target),
            labels => println!("\n{} matches: {}", target, labels.join(", ")),
        }
    }

    Ok(())
}
