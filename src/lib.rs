//! # Persona Mint
//!
//! Solana core of the persona marketplace: metadata instruction encoding,
//! recovery-phrase key derivation, atomic mint-and-sell transactions and
//! the transfer policy check.

pub mod config;
pub mod constants;
pub mod domain;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;
