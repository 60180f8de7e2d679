//! # Core Domain Entities
//!
//! Defines the identities and record-level values exchanged between the
//! protocol components and their collaborators.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `PublicKeyBytes`, `TrapdoorKey`
//! - **Record**: `RecordId`, `ContentAddress`, `CommitmentHash`, `Witness`

use crate::errors::ParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

// Re-export U256 from primitive-types for use across all components
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte hash (keccak256 or sha256).
pub type Hash = [u8; 32];

/// A 20-byte chain identity (Ethereum-style address).
pub type Address = [u8; 20];

/// Renders an address as lowercase `0x`-prefixed hex.
pub fn address_to_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Parses a `0x`-prefixed (or bare) 40 hex character address.
pub fn parse_address(value: &str) -> Result<Address, ParseError> {
    decode_fixed::<20>("address", value)
}

/// Decodes a fixed-width hex string, tolerating an optional `0x` prefix.
pub fn decode_fixed<const N: usize>(field: &'static str, value: &str) -> Result<[u8; N], ParseError> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex {
        field,
        reason: e.to_string(),
    })?;
    if bytes.len() != N {
        return Err(ParseError::InvalidLength {
            field,
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Compressed secp256k1 public key (33 bytes, `0x02`/`0x03` prefix).
///
/// Used as the encryption recipient key and as the chameleon-hash public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKeyBytes(pub [u8; 33]);

impl PublicKeyBytes {
    /// Parse from hex.
    pub fn from_hex(value: &str) -> Result<Self, ParseError> {
        decode_fixed::<33>("public_key", value).map(Self)
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }
}

impl fmt::Debug for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyBytes({})", self.to_hex())
    }
}

/// The owner's private trapdoor scalar.
///
/// Never logged, zeroized on drop. It leaves the owner's control plane only
/// as an argument to a redaction the owner initiated.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TrapdoorKey([u8; 32]);

impl TrapdoorKey {
    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the secret scalar bytes.
    pub fn expose_secret(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for TrapdoorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TrapdoorKey(<redacted>)")
    }
}

// =============================================================================
// CLUSTER B: RECORD
// =============================================================================

/// Opaque record identifier assigned by the anchoring collaborator.
///
/// Fixed-width so it can be signed as an EIP-712 `bytes32`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RecordId(pub Hash);

impl RecordId {
    /// Parse from `0x`-prefixed hex.
    pub fn from_hex(value: &str) -> Result<Self, ParseError> {
        decode_fixed::<32>("record_id", value).map(Self)
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// The zero id is what the registry reports for "no record".
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.to_hex())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// Content address (CID) of a ciphertext in the content store.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Validate and wrap a content address. Empty addresses are rejected.
    pub fn parse(value: impl Into<String>) -> Result<Self, ParseError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ParseError::EmptyContentAddress);
        }
        Ok(Self(value))
    }

    /// The address as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentAddress {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ContentAddress> for String {
    fn from(value: ContentAddress) -> Self {
        value.0
    }
}

impl fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentAddress({})", self.0)
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publicly anchored chameleon hash. Invariant across redactions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentHash(pub Hash);

impl CommitmentHash {
    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for CommitmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitmentHash({})", self.to_hex())
    }
}

/// Chameleon-hash randomness `r` opening a commitment for one payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Witness(pub [u8; 32]);

impl Witness {
    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Witness({})", self.to_hex())
    }
}
