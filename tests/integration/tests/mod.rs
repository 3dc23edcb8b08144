//! Integration test modules

mod key_recovery;
mod mint_sale;
