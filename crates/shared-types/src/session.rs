//! # Session Context
//!
//! Identity, role, network binding and record keys for one logged-in user.
//! A `Session` is created at login, handed explicitly to each component that
//! needs it, and consumed by `logout`. Nothing reads these values from
//! ambient state.

use crate::entities::{Address, PublicKeyBytes, TrapdoorKey};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the protocol the session acts for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    /// Record owner.
    Patient,
    /// Requester.
    Doctor,
    /// Custodian originating records on a patient's behalf.
    Admin,
}

/// Network binding for structured signatures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkContext {
    pub chain_id: u64,
    pub verifying_authority: Address,
    pub protocol_name: String,
    pub protocol_version: String,
}

/// The owner's record keypair: the public half encrypts and commits, the
/// secret half opens blobs and forges redaction witnesses.
#[derive(Clone, Debug)]
pub struct RecordKeys {
    pub public_key: PublicKeyBytes,
    pub trapdoor: TrapdoorKey,
}

/// Explicit per-user session.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    identity: Address,
    role: SessionRole,
    network: NetworkContext,
    keys: Option<RecordKeys>,
    started_at: Timestamp,
}

impl Session {
    /// Start a session for `identity`.
    pub fn login(
        identity: Address,
        role: SessionRole,
        network: NetworkContext,
        started_at: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            role,
            network,
            keys: None,
            started_at,
        }
    }

    /// Attach the owner's record keypair.
    pub fn with_record_keys(mut self, keys: RecordKeys) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn identity(&self) -> Address {
        self.identity
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn network(&self) -> &NetworkContext {
        &self.network
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn public_key(&self) -> Option<PublicKeyBytes> {
        self.keys.as_ref().map(|k| k.public_key)
    }

    /// The trapdoor, released only for records owned by this session.
    pub fn trapdoor_for(&self, owner: &Address) -> Option<&TrapdoorKey> {
        if *owner != self.identity {
            return None;
        }
        self.keys.as_ref().map(|k| &k.trapdoor)
    }

    /// End the session. Key material is zeroized as it drops.
    pub fn logout(self) -> Uuid {
        self.id
    }
}
