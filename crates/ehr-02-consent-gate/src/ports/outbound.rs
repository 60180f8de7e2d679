//! # Outbound Ports

use crate::domain::ConsentStatus;
use shared_types::{Address, RawTransaction, RecordId};
use thiserror::Error;

/// Error from the consent registry collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No such record
    #[error("Record not found")]
    NotFound,

    /// The caller may not perform this call
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The collaborator is unreachable
    #[error("Registry unavailable: {0}")]
    Unavailable(String),
}

/// The ledger-side registry holding each record's owner and consent flag.
#[async_trait::async_trait]
pub trait ConsentRegistry: Send + Sync {
    /// Owner and consent flag of a record.
    async fn consent_of(&self, record_id: &RecordId) -> Result<ConsentStatus, RegistryError>;

    /// Unsigned transaction that sets the flag when broadcast by `owner`.
    async fn toggle_consent(
        &self,
        record_id: &RecordId,
        owner: Address,
        active: bool,
    ) -> Result<RawTransaction, RegistryError>;
}

#[async_trait::async_trait]
impl<T: ConsentRegistry + ?Sized> ConsentRegistry for std::sync::Arc<T> {
    async fn consent_of(&self, record_id: &RecordId) -> Result<ConsentStatus, RegistryError> {
        (**self).consent_of(record_id).await
    }

    async fn toggle_consent(
        &self,
        record_id: &RecordId,
        owner: Address,
        active: bool,
    ) -> Result<RawTransaction, RegistryError> {
        (**self).toggle_consent(record_id, owner, active).await
    }
}
