//! # Raw Transaction Descriptor
//!
//! The loosely-shaped transaction object collaborators hand back for the user
//! to sign. It is parsed strictly: unknown fields are rejected and every
//! numeric field goes through [`Quantity`]. Semantic checks (recipient
//! present, single fee model) belong to the transaction broker.

use crate::entities::{address_to_hex, parse_address, Address};
use crate::errors::ParseError;
use crate::quantity::Quantity;
use serde::{Deserialize, Serialize};

/// Unsigned transaction as produced by a collaborator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawTransaction {
    #[serde(default, with = "opt_address", skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, with = "opt_address", skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Quantity>,
    #[serde(default, alias = "gasLimit", skip_serializing_if = "Option::is_none")]
    pub gas: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Quantity>,
    #[serde(default, with = "hex_bytes", skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
}

impl RawTransaction {
    /// Call to `to` carrying `data`, no fee fields.
    pub fn call(from: Address, to: Address, data: Vec<u8>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            data,
            ..Default::default()
        }
    }

    /// Parse a collaborator JSON payload.
    pub fn from_json(payload: &str) -> Result<Self, ParseError> {
        serde_json::from_str(payload).map_err(|e| ParseError::Schema(e.to_string()))
    }

    /// Whether any legacy fee field is set.
    pub fn has_legacy_fee(&self) -> bool {
        self.gas_price.is_some()
    }

    /// Whether any priority-fee field is set.
    pub fn has_priority_fee(&self) -> bool {
        self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some()
    }
}

mod opt_address {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Address>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(a) => s.serialize_str(&address_to_hex(a)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Address>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => parse_address(v).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        let raw = raw.unwrap_or_default();
        let digits = raw.strip_prefix("0x").unwrap_or(&raw);
        hex::decode(digits).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_mixed_numeric_encodings() {
        let tx = RawTransaction::from_json(
            r#"{
                "from": "0x00000000000000000000000000000000000000aa",
                "to": "0x00000000000000000000000000000000000000bb",
                "gas": 21000,
                "gasPrice": "1000000000",
                "nonce": "0x5",
                "data": "0xdeadbeef"
            }"#,
        )
        .unwrap();

        assert_eq!(tx.gas, Some(Quantity::from(21_000)));
        assert_eq!(tx.gas_price, Some(Quantity::from(1_000_000_000)));
        assert_eq!(tx.nonce, Some(Quantity::from(5)));
        assert_eq!(tx.data, vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(tx.has_legacy_fee());
        assert!(!tx.has_priority_fee());
    }

    #[test]
    fn test_unknown_field_is_schema_error() {
        let err = RawTransaction::from_json(r#"{"to": null, "surprise": 1}"#).unwrap_err();
        assert!(matches!(err, ParseError::Schema(_)));
    }

    #[test]
    fn test_missing_recipient_parses_as_none() {
        let tx = RawTransaction::from_json(r#"{"value": "0"}"#).unwrap();
        assert!(tx.to.is_none());
    }

    #[test]
    fn test_bad_address_rejected() {
        assert!(RawTransaction::from_json(r#"{"to": "0x1234"}"#).is_err());
    }
}
