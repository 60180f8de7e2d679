//! # Outbound Ports (Driven Ports / SPI)
//!
//! One trait per collaborator. Each call is a single suspension point; the
//! manager never has two of them outstanding for the same record.

use crate::domain::entities::{EncryptedBlob, RecordDescriptor};
use shared_types::{
    Address, CommitmentHash, ContentAddress, PublicKeyBytes, RawTransaction, RecordId, TrapdoorKey,
    Witness,
};
use thiserror::Error;

/// Error reported by any collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Unreachable or timed out
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Reached, but refused the request
    #[error("Rejected: {0}")]
    Rejected(String),

    /// No such record or object
    #[error("Not found")]
    NotFound,

    /// Response did not match the expected schema
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl CollaboratorError {
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Encrypts plaintext for a recipient public key.
#[async_trait::async_trait]
pub trait Encryptor: Send + Sync {
    async fn encrypt(
        &self,
        plaintext: &[u8],
        recipient: &PublicKeyBytes,
    ) -> Result<EncryptedBlob, CollaboratorError>;
}

/// Content-addressed blob store.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a blob. Same bytes give the same address.
    async fn upload(&self, blob: &EncryptedBlob) -> Result<ContentAddress, CollaboratorError>;

    /// Fetch a blob by address.
    async fn fetch(&self, content_address: &ContentAddress) -> Result<EncryptedBlob, CollaboratorError>;
}

/// Chameleon-hash commitment service.
#[async_trait::async_trait]
pub trait CommitmentScheme: Send + Sync {
    /// Fresh commitment to a content address under the owner's key.
    async fn commit(
        &self,
        content_address: &ContentAddress,
        public_key: &PublicKeyBytes,
    ) -> Result<(CommitmentHash, Witness), CollaboratorError>;

    /// Witness that opens the existing commitment for `new_content_address`.
    async fn collide(
        &self,
        old_content_address: &ContentAddress,
        old_witness: &Witness,
        new_content_address: &ContentAddress,
        public_key: &PublicKeyBytes,
        trapdoor: &TrapdoorKey,
    ) -> Result<Witness, CollaboratorError>;
}

/// Request to anchor a new record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreRecord {
    pub content_address: ContentAddress,
    pub commitment_hash: CommitmentHash,
    pub witness: Witness,
    pub owner: Address,
}

/// Request to redact an anchored record.
///
/// The registry must check that `old_*` opens the anchored commitment and
/// that `new_*` opens the same commitment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateRecord {
    pub record_id: RecordId,
    pub new_content_address: ContentAddress,
    pub new_witness: Witness,
    pub commitment_hash: CommitmentHash,
    pub old_content_address: ContentAddress,
    pub old_witness: Witness,
    pub owner: Address,
}

/// Ledger-side record registry.
#[async_trait::async_trait]
pub trait RecordRegistry: Send + Sync {
    /// Bind a public key to a chain identity.
    async fn register_identity(
        &self,
        identity: Address,
        public_key: &PublicKeyBytes,
    ) -> Result<RawTransaction, CollaboratorError>;

    /// Prepare anchoring of a new record; assigns the record id.
    async fn store_record(
        &self,
        request: &StoreRecord,
    ) -> Result<(RecordId, RawTransaction), CollaboratorError>;

    /// Prepare a redaction of an anchored record.
    async fn update_record(&self, request: &UpdateRecord) -> Result<RawTransaction, CollaboratorError>;

    /// Current ledger view of a record.
    async fn record(&self, record_id: &RecordId) -> Result<RecordDescriptor, CollaboratorError>;
}
