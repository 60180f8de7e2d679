//! # Numeric Quantities
//!
//! Wallet-facing numeric fields are loosely typed upstream: JSON numbers,
//! decimal strings and `0x` hex strings all occur. `Quantity` accepts all
//! three and always serializes to the canonical minimal `0x` hex form.

use crate::entities::U256;
use crate::errors::ParseError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 256-bit unsigned quantity with canonical hex encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(pub U256);

impl Quantity {
    /// Zero.
    pub const ZERO: Quantity = Quantity(U256::zero());

    /// Parse a decimal or `0x` hex string.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidQuantity {
            value: value.to_string(),
        };
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }
        match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some("") => Err(invalid()),
            Some(digits) => U256::from_str_radix(digits, 16)
                .map(Quantity)
                .map_err(|_| invalid()),
            None => U256::from_dec_str(trimmed)
                .map(Quantity)
                .map_err(|_| invalid()),
        }
    }

    /// Canonical minimal hex, e.g. `0x0`, `0x2a`.
    pub fn to_hex(&self) -> String {
        format!("{:#x}", self.0)
    }

    /// Low 64 bits, saturating.
    pub fn low_u64_saturating(&self) -> u64 {
        if self.0 > U256::from(u64::MAX) {
            u64::MAX
        } else {
            self.0.low_u64()
        }
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Quantity(U256::from(value))
    }
}

impl From<U256> for Quantity {
    fn from(value: U256) -> Self {
        Quantity(value)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

struct QuantityVisitor;

impl<'de> Visitor<'de> for QuantityVisitor {
    type Value = Quantity;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer, decimal string or 0x-prefixed hex string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
        Ok(Quantity::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
        u64::try_from(v)
            .map(Quantity::from)
            .map_err(|_| E::custom(format!("negative quantity: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
        Quantity::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }
}
