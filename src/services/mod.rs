//! # Services Module
//!
//! External service integrations. The marketplace core talks to exactly one
//! external system: the Solana ledger.

pub mod provider;
pub use provider::*;
