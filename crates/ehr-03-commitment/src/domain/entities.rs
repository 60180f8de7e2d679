//! # Commitment Entities

use shared_types::{Address, CommitmentHash, ContentAddress, RecordId, Witness};
use std::fmt;

/// Ciphertext produced by the encryptor. Opaque to this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedBlob(Vec<u8>);

impl EncryptedBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptedBlob({} bytes)", self.0.len())
    }
}

/// The on-ledger view of a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordDescriptor {
    pub record_id: RecordId,
    pub content_address: ContentAddress,
    pub commitment_hash: CommitmentHash,
    pub witness: Witness,
    pub owner: Address,
}
