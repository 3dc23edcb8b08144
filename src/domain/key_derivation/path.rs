//! Hardened derivation path notation (`m/44'/501'/0'/0'`).

use std::{fmt, str::FromStr};

use crate::constants::HARDENED_OFFSET;

use super::KeyDerivationError;

/// A derivation path whose every segment is hardened.
///
/// Indices are stored without the hardened offset; [`DerivationPath::hardened_indices`]
/// yields the values actually fed to child derivation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    indices: Vec<u32>,
}

impl DerivationPath {
    /// Builds a path from unhardened indices, e.g. `[44, 501, 0, 0]`.
    pub fn new(indices: Vec<u32>) -> Result<Self, KeyDerivationError> {
        if let Some(index) = indices.iter().find(|i| **i >= HARDENED_OFFSET) {
            return Err(KeyDerivationError::InvalidPath(format!(
                "index {index} is out of range"
            )));
        }
        Ok(Self { indices })
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Indices with the hardened bit set.
    pub fn hardened_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.indices.iter().map(|i| i + HARDENED_OFFSET)
    }

    pub fn depth(&self) -> usize {
        self.indices.len()
    }
}

impl FromStr for DerivationPath {
    type Err = KeyDerivationError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let mut segments = path.trim().split('/');

        match segments.next() {
            Some("m") | Some("M") => {}
            _ => {
                return Err(KeyDerivationError::InvalidPath(format!(
                    "{path}: must start with 'm'"
                )))
            }
        }

        let indices = segments
            .map(|segment| {
                let digits = segment
                    .strip_suffix('\'')
                    .or_else(|| segment.strip_suffix('h'))
                    .or_else(|| segment.strip_suffix('H'))
                    .ok_or_else(|| {
                        KeyDerivationError::InvalidPath(format!(
                            "{path}: segment '{segment}' is not hardened"
                        ))
                    })?;

                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(KeyDerivationError::InvalidPath(format!(
                        "{path}: segment '{segment}' is not a number"
                    )));
                }

                digits.parse::<u32>().map_err(|e| {
                    KeyDerivationError::InvalidPath(format!("{path}: segment '{segment}': {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(indices)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for index in &self.indices {
            write!(f, "/{index}'")?;
        }
        Ok(())
    }
}
