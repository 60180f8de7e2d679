//! # Request Ledger Service

use crate::domain::{reconcile, LedgerEntry, LedgerError, ViewerRole};
use crate::ports::inbound::RequestLedgerApi;
use crate::ports::outbound::{LocalRequests, RequestDirectory};
use ehr_telemetry::log_event;
use shared_types::{address_to_hex, Address, TimeSource};
use std::sync::Arc;

const COMPONENT: &str = "request-ledger";

/// Snapshot-on-demand request listing.
pub struct RequestLedger {
    directory: Arc<dyn RequestDirectory>,
    local: Option<Arc<dyn LocalRequests>>,
    clock: Arc<dyn TimeSource>,
}

impl RequestLedger {
    pub fn new(directory: Arc<dyn RequestDirectory>, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            directory,
            local: None,
            clock,
        }
    }

    /// Merge this session's unconfirmed submissions into listings.
    pub fn with_local(mut self, local: Arc<dyn LocalRequests>) -> Self {
        self.local = Some(local);
        self
    }
}

#[async_trait::async_trait]
impl RequestLedgerApi for RequestLedger {
    #[tracing::instrument(skip_all, fields(identity = %address_to_hex(&identity), role = ?role))]
    async fn list(&self, identity: Address, role: ViewerRole) -> Result<Vec<LedgerEntry>, LedgerError> {
        let remote = self
            .directory
            .requests_for(identity, role)
            .await
            .map_err(|e| LedgerError::Directory(e.to_string()))?;
        let local = self
            .local
            .as_ref()
            .map(|local| local.local_requests())
            .unwrap_or_default();

        let entries = reconcile(remote, local, identity, role, self.clock.now())?;
        log_event!(debug, COMPONENT, "Request snapshot built", entries = entries.len());
        Ok(entries)
    }
}
