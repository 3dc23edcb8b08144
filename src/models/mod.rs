//! # Models
//!
//! Data types shared between the marketplace components.

mod error;
pub use error::*;

mod metadata;
pub use metadata::*;

mod transaction;
pub use transaction::*;

mod mint_sale;
pub use mint_sale::*;
