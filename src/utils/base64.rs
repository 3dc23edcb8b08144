//! Standard-alphabet base64 used for transactions on the wire.

use base64::{engine::general_purpose::STANDARD, Engine};

pub fn base64_encode(message: &[u8]) -> String {
    STANDARD.encode(message)
}

pub fn base64_decode(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(data)
}
