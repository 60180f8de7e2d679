//! # Inbound Ports

use crate::domain::{LedgerEntry, LedgerError, ViewerRole};
use shared_types::Address;

#[async_trait::async_trait]
pub trait RequestLedgerApi: Send + Sync {
    /// Fresh snapshot of `identity`'s requests, newest first.
    async fn list(&self, identity: Address, role: ViewerRole) -> Result<Vec<LedgerEntry>, LedgerError>;
}
