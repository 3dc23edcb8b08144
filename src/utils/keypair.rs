//! Loading signing keypairs from stored secrets.

use ed25519_dalek::SigningKey;
use solana_sdk::signature::{keypair_from_seed, Keypair};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::{constants::ED25519_SEED_LENGTH, models::LedgerError};

const KEYPAIR_LENGTH: usize = ED25519_SEED_LENGTH * 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeypairError {
    #[error("Secret key is not valid base58")]
    InvalidEncoding,

    #[error("Secret key must be {KEYPAIR_LENGTH} bytes, got {0}")]
    InvalidLength(usize),

    #[error("Public half of the secret key does not match its private half")]
    PublicKeyMismatch,

    #[error("Failed to build keypair: {0}")]
    Construction(String),
}

impl From<KeypairError> for LedgerError {
    fn from(err: KeypairError) -> Self {
        LedgerError::InputRejected(err.to_string())
    }
}

/// Decodes a base58 64-byte keypair (private half then public half).
///
/// The signing key is rebuilt from the private half; a stored public half
/// that does not belong to it is rejected.
pub fn load_keypair_from_base58(secret: &str) -> Result<Keypair, KeypairError> {
    let bytes = Zeroizing::new(
        bs58::decode(secret.trim())
            .into_vec()
            .map_err(|_| KeypairError::InvalidEncoding)?,
    );
    if bytes.len() != KEYPAIR_LENGTH {
        return Err(KeypairError::InvalidLength(bytes.len()));
    }

    let mut private = Zeroizing::new([0u8; ED25519_SEED_LENGTH]);
    private.copy_from_slice(&bytes[..ED25519_SEED_LENGTH]);

    let signing_key = SigningKey::from_bytes(&private);
    if signing_key.verifying_key().as_bytes()[..] != bytes[ED25519_SEED_LENGTH..] {
        return Err(KeypairError::PublicKeyMismatch);
    }

    keypair_from_seed(&private[..]).map_err(|e| KeypairError::Construction(e.to_string()))
}
