mod logging;
pub use logging::*;

mod metadata;
pub use metadata::*;

mod derivation;
pub use derivation::*;

mod retry;
pub use retry::*;

mod solana_transaction;
pub use solana_transaction::*;
