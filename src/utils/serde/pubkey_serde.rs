//! Serde helpers that carry addresses as base58 strings.
//!
//! Use with `#[serde(with = "crate::utils::pubkey_string")]`.

use std::{fmt, str::FromStr};

use serde::{de, Deserializer, Serializer};
use solana_sdk::pubkey::Pubkey;

pub mod pubkey_string {
    use super::*;

    pub fn serialize<S>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&pubkey.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pubkey, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(PubkeyVisitor)
    }
}

struct PubkeyVisitor;

impl de::Visitor<'_> for PubkeyVisitor {
    type Value = Pubkey;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a base58 encoded address")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Pubkey::from_str(value.trim()).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "pubkey_string")]
        address: Pubkey,
    }

    #[test]
    fn test_serializes_as_base58() {
        let address = Pubkey::new_unique();
        let json = serde_json::to_value(Holder { address }).unwrap();
        assert_eq!(json["address"], address.to_string());
    }

    #[test]
    fn test_deserializes_from_base58() {
        let address = Pubkey::new_unique();
        let json = format!(r#"{{"address": "{address}"}}"#);
        let holder: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(holder.address, address);
    }

    #[test]
    fn test_rejects_invalid_address() {
        assert!(serde_json::from_str::<Holder>(r#"{"address": "nope"}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"address": 7}"#).is_err());
    }
}
