//! # Domain Layer

use shared_types::{Address, RecordId};
use thiserror::Error;

/// Consent as reported by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsentStatus {
    pub owner: Address,
    pub active: bool,
}

/// Consent gate errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsentError {
    /// The caller is not the record's owner.
    #[error("Caller is not the owner of record {record_id}")]
    NotOwner { record_id: RecordId },

    /// The registry has no such record.
    #[error("Unknown record {0}")]
    UnknownRecord(RecordId),

    /// The registry could not be reached or refused the call.
    #[error("Consent registry error: {0}")]
    Registry(String),
}
