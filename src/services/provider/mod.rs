//! Ledger access.
//!
//! Only Solana is supported; the provider is kept behind a trait so the
//! transaction builders can be exercised without a network.

mod solana;
pub use solana::*;

mod retry;
pub use retry::*;
