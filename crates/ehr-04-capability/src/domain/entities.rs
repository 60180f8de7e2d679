//! # Capability Entities

use serde::{Deserialize, Serialize};
use shared_crypto::RecoverableSignature;
use shared_types::{address_to_hex, Address, Hash, RecordId, Timestamp, U256};
use std::fmt;
use subtle::ConstantTimeEq;

/// Capability class, signed as `uint8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Role {
    Read = 0,
    Write = 1,
}

impl Role {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Role::Read),
            1 => Some(Role::Write),
            _ => None,
        }
    }
}

/// Request status.
///
/// `Approved` is not terminal: it decays to `Expired`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
    Cancelled,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Rejected | RequestStatus::Expired | RequestStatus::Cancelled
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Expired => "expired",
            RequestStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Identifier of a request: its EIP-712 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub Hash);

impl RequestId {
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({})", self.to_hex())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The fields a requester signs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedAccessRequest {
    pub requester: Address,
    pub owner: Address,
    pub record_id: RecordId,
    pub role: Role,
    pub timestamp: Timestamp,
    pub nonce: U256,
    /// Validity window in milliseconds.
    pub ttl: u64,
}

impl UnsignedAccessRequest {
    /// `timestamp + ttl`, saturating.
    pub fn expiry(&self) -> Timestamp {
        self.timestamp.saturating_add(self.ttl)
    }

    pub fn replay_key(&self) -> ReplayKey {
        (self.requester, self.owner, self.record_id, self.nonce)
    }
}

/// Anti-replay key.
pub type ReplayKey = (Address, Address, RecordId, U256);

/// Request plus its detached signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedAccessRequest {
    pub request: UnsignedAccessRequest,
    pub signature: RecoverableSignature,
}

/// A submitted request as tracked by the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessRequest {
    pub id: RequestId,
    pub request: UnsignedAccessRequest,
    pub signature: RecoverableSignature,
    /// Status as last recorded, before time-based demotion.
    pub status: RequestStatus,
}

impl AccessRequest {
    pub fn requester(&self) -> Address {
        self.request.requester
    }

    pub fn owner(&self) -> Address {
        self.request.owner
    }

    pub fn record_id(&self) -> RecordId {
        self.request.record_id
    }

    pub fn expiry(&self) -> Timestamp {
        self.request.expiry()
    }

    /// Human-readable one-liner for logs and listings.
    pub fn summary(&self) -> String {
        format!(
            "{} {} -> {} on {} ({})",
            self.id,
            address_to_hex(&self.request.requester),
            address_to_hex(&self.request.owner),
            self.request.record_id,
            self.status
        )
    }
}

/// Opaque bearer value. Never printed.
#[derive(Clone, Copy)]
pub struct BearerToken(pub [u8; 32]);

impl BearerToken {
    pub fn expose_secret(&self) -> &[u8; 32] {
        &self.0
    }
}

impl PartialEq for BearerToken {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for BearerToken {}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Read capability for one record, valid until `expiry`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityToken {
    pub request_id: RequestId,
    pub record_id: RecordId,
    pub expiry: Timestamp,
    pub bearer: BearerToken,
}

impl CapabilityToken {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expiry
    }
}
