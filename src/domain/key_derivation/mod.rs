//! Recovers signing keypairs from a recovery phrase.
//!
//! Wallet tools have historically turned the same phrase into different
//! keys. Recovery therefore derives one keypair per known convention and
//! reports every candidate, flagging the ones whose address equals an
//! optional target. A target that matches nothing is a normal outcome.

mod path;
pub use path::*;

mod slip10;
pub use slip10::*;

use std::str::FromStr;

use bip39::{Language, Mnemonic};
use log::{debug, info};
use serde::{Serialize, Serializer};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{keypair_from_seed, Keypair, Signer},
};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::{
    constants::{
        DIRECT_ENTROPY_LABEL, ED25519_SEED_LENGTH, RAW_SEED_LABEL, RECOVERY_DERIVATION_PATHS,
    },
    models::LedgerError,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyDerivationError {
    #[error("Invalid recovery phrase: {0}")]
    InvalidPhrase(String),

    #[error("Invalid target address: {0}")]
    InvalidTargetAddress(String),

    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("Key derivation failed: {0}")]
    Derivation(String),
}

impl From<KeyDerivationError> for LedgerError {
    fn from(err: KeyDerivationError) -> Self {
        LedgerError::InputRejected(err.to_string())
    }
}

/// Secret material extracted from a validated phrase.
struct PhraseMaterial {
    entropy: Zeroizing<Vec<u8>>,
    seed: Zeroizing<[u8; 64]>,
}

impl PhraseMaterial {
    fn from_mnemonic(mnemonic: &Mnemonic, passphrase: &str) -> Self {
        Self {
            entropy: Zeroizing::new(mnemonic.to_entropy()),
            seed: Zeroizing::new(mnemonic.to_seed(passphrase)),
        }
    }
}

/// One way of turning phrase material into an ed25519 keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivationScheme {
    /// Phrase entropy, zero-padded to 32 bytes, used as the ed25519 seed.
    DirectEntropy,
    /// First 32 bytes of the BIP39 seed used as the ed25519 seed.
    RawSeed,
    /// Hardened hierarchical derivation from the BIP39 seed.
    Path(DerivationPath),
}

impl DerivationScheme {
    pub fn label(&self) -> String {
        match self {
            DerivationScheme::DirectEntropy => DIRECT_ENTROPY_LABEL.to_string(),
            DerivationScheme::RawSeed => RAW_SEED_LABEL.to_string(),
            DerivationScheme::Path(path) => path.to_string(),
        }
    }

    fn path(&self) -> Option<&DerivationPath> {
        match self {
            DerivationScheme::Path(path) => Some(path),
            _ => None,
        }
    }

    fn derive(&self, material: &PhraseMaterial) -> Result<Keypair, KeyDerivationError> {
        match self {
            DerivationScheme::DirectEntropy => {
                let mut padded = Zeroizing::new([0u8; ED25519_SEED_LENGTH]);
                let len = material.entropy.len().min(ED25519_SEED_LENGTH);
                padded[..len].copy_from_slice(&material.entropy[..len]);
                keypair_from_ed25519_seed(&padded[..])
            }
            DerivationScheme::RawSeed => {
                keypair_from_ed25519_seed(&material.seed[..ED25519_SEED_LENGTH])
            }
            DerivationScheme::Path(path) => {
                let key = ExtendedSecretKey::from_seed(&material.seed[..])?.derive_path(path)?;
                keypair_from_ed25519_seed(key.secret_bytes())
            }
        }
    }
}

fn keypair_from_ed25519_seed(seed: &[u8]) -> Result<Keypair, KeyDerivationError> {
    keypair_from_seed(seed).map_err(|e| KeyDerivationError::Derivation(e.to_string()))
}

/// Schemes tried during recovery, in report order.
pub fn recovery_schemes() -> Result<Vec<DerivationScheme>, KeyDerivationError> {
    let mut schemes = vec![DerivationScheme::DirectEntropy, DerivationScheme::RawSeed];
    for raw in RECOVERY_DERIVATION_PATHS {
        schemes.push(DerivationScheme::Path(raw.parse()?));
    }
    Ok(schemes)
}

/// One recovered keypair.
#[derive(Clone, Serialize)]
pub struct DerivedKeyCandidate {
    pub label: String,
    pub path: Option<String>,
    pub address: String,
    /// Base58 of the 64-byte keypair, the format wallet import flows expect.
    #[serde(serialize_with = "serialize_secret")]
    pub secret_key: Zeroizing<String>,
    pub matches_target: bool,
}

impl std::fmt::Debug for DerivedKeyCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeyCandidate")
            .field("label", &self.label)
            .field("path", &self.path)
            .field("address", &self.address)
            .field("matches_target", &self.matches_target)
            .finish_non_exhaustive()
    }
}

fn serialize_secret<S: Serializer>(secret: &Zeroizing<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(secret)
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyRecoveryReport {
    pub target: Option<String>,
    pub candidates: Vec<DerivedKeyCandidate>,
}

impl KeyRecoveryReport {
    pub fn matches(&self) -> impl Iterator<Item = &DerivedKeyCandidate> {
        self.candidates.iter().filter(|c| c.matches_target)
    }

    pub fn matched_labels(&self) -> Vec<&str> {
        self.matches().map(|c| c.label.as_str()).collect()
    }
}

/// Lowercases and collapses whitespace so pasted phrases validate.
pub fn normalize_phrase(phrase: &str) -> Zeroizing<String> {
    Zeroizing::new(
        phrase
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn parse_target(target: Option<&str>) -> Result<Option<Pubkey>, KeyDerivationError> {
    match target.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Pubkey::from_str(raw)
            .map(Some)
            .map_err(|e| KeyDerivationError::InvalidTargetAddress(format!("{raw}: {e}"))),
    }
}

/// Derives every recovery candidate for `phrase`.
///
/// The phrase and target are validated before any key is derived. An
/// optional BIP39 `passphrase` feeds the seed-based schemes; direct entropy
/// ignores it.
pub fn recover_keypairs(
    phrase: &str,
    target: Option<&str>,
    passphrase: &str,
) -> Result<KeyRecoveryReport, KeyDerivationError> {
    let normalized = normalize_phrase(phrase);
    if normalized.is_empty() {
        return Err(KeyDerivationError::InvalidPhrase(
            "phrase is empty".to_string(),
        ));
    }
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, &normalized)
        .map_err(|e| KeyDerivationError::InvalidPhrase(e.to_string()))?;
    let target = parse_target(target)?;

    let material = PhraseMaterial::from_mnemonic(&mnemonic, passphrase);
    let candidates = recovery_schemes()?
        .iter()
        .map(|scheme| {
            let keypair = scheme.derive(&material)?;
            let address = keypair.pubkey();
            let matches_target = target.as_ref() == Some(&address);
            debug!("Candidate {} -> {}", scheme.label(), address);

            Ok(DerivedKeyCandidate {
                label: scheme.label(),
                path: scheme.path().map(ToString::to_string),
                address: address.to_string(),
                secret_key: Zeroizing::new(keypair.to_base58_string()),
                matches_target,
            })
        })
        .collect::<Result<Vec<_>, KeyDerivationError>>()?;

    let report = KeyRecoveryReport {
        target: target.map(|t| t.to_string()),
        candidates,
    };
    match &report.target {
        Some(target) => info!(
            "Derived {} candidates, {} match {}",
            report.candidates.len(),
            report.matches().count(),
            target
        ),
        None => info!("Derived {} candidates", report.candidates.len()),
    }
    Ok(report)
}
