//! Hardened-only ed25519 hierarchical derivation.
//!
//! Master key: `I = HMAC-SHA512(key = "ed25519 seed", data = seed)`.
//! Child key: `I = HMAC-SHA512(key = chain_code, data = 0x00 || k || ser32(i))`
//! with `i >= 2^31`. In both cases the left 32 bytes of `I` are the private
//! key and the right 32 bytes the chain code.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::constants::ED25519_CURVE_SEED;

use super::{DerivationPath, KeyDerivationError};

type HmacSha512 = Hmac<Sha512>;

/// A private key together with its chain code.
#[derive(Clone)]
pub struct ExtendedSecretKey {
    secret: Zeroizing<[u8; 32]>,
    chain_code: Zeroizing<[u8; 32]>,
}

impl std::fmt::Debug for ExtendedSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedSecretKey").finish_non_exhaustive()
    }
}

impl ExtendedSecretKey {
    /// Derives the master key from a BIP39 seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self, KeyDerivationError> {
        Self::from_hmac(ED25519_CURVE_SEED, &[seed])
    }

    /// Derives the hardened child at `hardened_index` (offset already applied).
    pub fn derive_child(&self, hardened_index: u32) -> Result<Self, KeyDerivationError> {
        Self::from_hmac(
            &self.chain_code[..],
            &[&[0u8][..], &self.secret[..], &hardened_index.to_be_bytes()[..]],
        )
    }

    /// Walks `path` starting from this key.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, KeyDerivationError> {
        path.hardened_indices()
            .try_fold(self.clone(), |key, index| key.derive_child(index))
    }

    pub fn secret_bytes(&self) -> &[u8; 32] {
        &self.secret
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    fn from_hmac(key: &[u8], data: &[&[u8]]) -> Result<Self, KeyDerivationError> {
        let mut mac = HmacSha512::new_from_slice(key)
            .map_err(|e| KeyDerivationError::Derivation(e.to_string()))?;
        for chunk in data {
            mac.update(chunk);
        }
        let mut output = Zeroizing::new([0u8; 64]);
        output.copy_from_slice(&mac.finalize().into_bytes());

        let mut secret = Zeroizing::new([0u8; 32]);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        secret.copy_from_slice(&output[..32]);
        chain_code.copy_from_slice(&output[32..]);

        Ok(Self { secret, chain_code })
    }
}
