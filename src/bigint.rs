//! Decimal-string serde for arbitrary-precision amounts
//!
//! Quantity fields are `num_bigint::BigInt` everywhere in the ledger; on the
//! wire and in snapshots they are encoded as plain decimal strings so that
//! uint256-scale values survive JSON round trips without precision loss.
//!
//! Usage: `#[serde(with = "crate::bigint")]` for `BigInt` fields,
//! `crate::bigint::option` / `crate::bigint::vec` for the wrapped forms.

use num_bigint::{BigInt, Sign};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse::<BigInt>()
        .map_err(|e| D::Error::custom(format!("invalid big integer '{}': {}", raw, e)))
}

/// True if the value is strictly below zero.
pub fn is_negative(value: &BigInt) -> bool {
    value.sign() == Sign::Minus
}

/// True if the value is exactly zero.
pub fn is_zero(value: &BigInt) -> bool {
    value.sign() == Sign::NoSign
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<BigInt>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BigInt>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            s.parse::<BigInt>()
                .map_err(|e| D::Error::custom(format!("invalid big integer '{}': {}", s, e)))
        })
        .transpose()
    }
}

pub mod vec {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[BigInt], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| v.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<BigInt>, D::Error> {
        let raw: Vec<String> = Vec::deserialize(deserializer)?;
        raw.into_iter()
            .map(|s| {
                s.parse::<BigInt>()
                    .map_err(|e| D::Error::custom(format!("invalid big integer '{}': {}", s, e)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        #[serde(with = "crate::bigint")]
        amount: BigInt,
        #[serde(with = "crate::bigint::option")]
        nonce: Option<BigInt>,
        #[serde(with = "crate::bigint::vec")]
        values: Vec<BigInt>,
    }

    #[test]
    fn test_round_trip_large_values() {
        let sample = Sample {
            amount: "115792089237316195423570985008687907853269984665640564039457584007913129639935"
                .parse()
                .unwrap(),
            nonce: Some(BigInt::from(-42)),
            values: vec![BigInt::from(0), BigInt::from(7)],
        };
        let json = serde_json::to_string(&sample).unwrap();
        let back: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(sample, back);
    }

    #[test]
    fn test_amounts_encode_as_strings() {
        let sample = Sample {
            amount: BigInt::from(9),
            nonce: None,
            values: vec![],
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("\"amount\":\"9\""));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = serde_json::from_str::<Sample>(r#"{"amount":"bogus","nonce":null,"values":[]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_sign_helpers() {
        assert!(is_negative(&BigInt::from(-1)));
        assert!(!is_negative(&BigInt::from(0)));
        assert!(is_zero(&BigInt::from(0)));
        assert!(!is_zero(&BigInt::from(3)));
    }
}
