//! Deserialization of whole-unit prices.
//!
//! Callers send prices either as JSON integers or as decimal strings
//! (`"50"`), the latter to survive JavaScript number precision.

use std::fmt;

use serde::{de, Deserializer};

struct WholeUnitsVisitor;

impl de::Visitor<'_> for WholeUnitsVisitor {
    type Value = u64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative whole number or a string containing one")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value.trim().parse::<u64>().map_err(de::Error::custom)
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(value)
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        u64::try_from(value).map_err(|_| de::Error::custom("price must not be negative"))
    }
}

pub fn deserialize_whole_units<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(WholeUnitsVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Price {
        #[serde(deserialize_with = "deserialize_whole_units")]
        value: u64,
    }

    #[test]
    fn test_accepts_integer_and_string() {
        assert_eq!(serde_json::from_str::<Price>(r#"{"value": 50}"#).unwrap().value, 50);
        assert_eq!(serde_json::from_str::<Price>(r#"{"value": " 50 "}"#).unwrap().value, 50);
        assert_eq!(
            serde_json::from_str::<Price>(r#"{"value": "18446744073709551615"}"#)
                .unwrap()
                .value,
            u64::MAX
        );
    }

    #[test]
    fn test_rejects_negative_fractional_and_text() {
        let negative = serde_json::from_str::<Price>(r#"{"value": -1}"#).unwrap_err();
        assert!(negative.to_string().contains("price must not be negative"));
        assert!(serde_json::from_str::<Price>(r#"{"value": 1.5}"#).is_err());
        assert!(serde_json::from_str::<Price>(r#"{"value": "fifty"}"#).is_err());
    }
}
