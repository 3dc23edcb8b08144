mod serde;
pub use serde::*;

mod base64;
pub use base64::*;

mod keypair;
pub use keypair::*;

mod token;
pub use token::*;

mod url;
pub use url::*;
