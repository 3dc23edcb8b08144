mod pubkey_serde;
pub use pubkey_serde::*;

mod whole_units;
pub use whole_units::*;
