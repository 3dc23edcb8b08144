//! # Domain Module
//!
//! Core marketplace logic:
//!
//! * Instruction data encoding and token metadata instructions
//! * Recovery-phrase key derivation
//! * Atomic mint-and-sell transactions
//! * Transfer policy checks

pub mod encoding;

pub mod metadata;
pub use metadata::*;

pub mod key_derivation;
pub use key_derivation::*;

pub mod mint_sale;
pub use mint_sale::*;

pub mod transfer_policy;
pub use transfer_policy::*;
