//! # Inbound Ports

use crate::domain::ConsentError;
use shared_types::{Address, RawTransaction, RecordId};

/// Consent gate API, as consumed by the commitment and capability components.
#[async_trait::async_trait]
pub trait ConsentGateApi: Send + Sync {
    /// Fresh read of the record's consent flag.
    async fn is_active(&self, record_id: &RecordId) -> Result<bool, ConsentError>;

    /// Build the owner's toggle transaction.
    ///
    /// # Errors
    /// * `NotOwner` - `owner` is not the registered owner of the record
    async fn set(
        &self,
        record_id: &RecordId,
        owner: Address,
        active: bool,
    ) -> Result<RawTransaction, ConsentError>;
}
