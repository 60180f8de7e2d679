//! # Consent Gate Service

use crate::domain::{ConsentError, ConsentStatus};
use crate::ports::inbound::ConsentGateApi;
use crate::ports::outbound::{ConsentRegistry, RegistryError};
use ehr_telemetry::log_record_event;
use parking_lot::RwLock;
use shared_types::{Address, RawTransaction, RecordId};
use std::collections::HashMap;

const COMPONENT: &str = "consent-gate";

/// Consent gate over a registry collaborator.
///
/// Keeps the last observed flag per record for display only; decisions
/// always use a fresh read.
pub struct ConsentGate<R: ConsentRegistry> {
    registry: R,
    observed: RwLock<HashMap<RecordId, bool>>,
}

impl<R: ConsentRegistry> ConsentGate<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            observed: RwLock::new(HashMap::new()),
        }
    }

    /// Last flag seen for a record, if any.
    pub fn last_observed(&self, record_id: &RecordId) -> Option<bool> {
        self.observed.read().get(record_id).copied()
    }

    async fn status(&self, record_id: &RecordId) -> Result<ConsentStatus, ConsentError> {
        let status = self
            .registry
            .consent_of(record_id)
            .await
            .map_err(|e| map_registry_error(e, record_id))?;
        self.observed.write().insert(*record_id, status.active);
        Ok(status)
    }
}

#[async_trait::async_trait]
impl<R: ConsentRegistry> ConsentGateApi for ConsentGate<R> {
    async fn is_active(&self, record_id: &RecordId) -> Result<bool, ConsentError> {
        Ok(self.status(record_id).await?.active)
    }

    async fn set(
        &self,
        record_id: &RecordId,
        owner: Address,
        active: bool,
    ) -> Result<RawTransaction, ConsentError> {
        let status = self.status(record_id).await?;
        if status.owner != owner {
            log_record_event!(warn, COMPONENT, "Consent change by non-owner refused", record_id);
            return Err(ConsentError::NotOwner {
                record_id: *record_id,
            });
        }

        let tx = self
            .registry
            .toggle_consent(record_id, owner, active)
            .await
            .map_err(|e| map_registry_error(e, record_id))?;

        log_record_event!(info, COMPONENT, "Consent toggle prepared", record_id, active);
        Ok(tx)
    }
}

fn map_registry_error(error: RegistryError, record_id: &RecordId) -> ConsentError {
    match error {
        RegistryError::NotFound => ConsentError::UnknownRecord(*record_id),
        RegistryError::Forbidden(_) => ConsentError::NotOwner {
            record_id: *record_id,
        },
        RegistryError::Unavailable(reason) => ConsentError::Registry(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    const OWNER: Address = [0xAA; 20];
    const RECORD: RecordId = RecordId([1; 32]);

    #[derive(Default)]
    struct FakeRegistry {
        flags: Mutex<HashMap<RecordId, bool>>,
    }

    #[async_trait::async_trait]
    impl ConsentRegistry for FakeRegistry {
        async fn consent_of(&self, record_id: &RecordId) -> Result<ConsentStatus, RegistryError> {
            self.flags
                .lock()
                .get(record_id)
                .map(|active| ConsentStatus {
                    owner: OWNER,
                    active: *active,
                })
                .ok_or(RegistryError::NotFound)
        }

        async fn toggle_consent(
            &self,
            _record_id: &RecordId,
            owner: Address,
            active: bool,
        ) -> Result<RawTransaction, RegistryError> {
            Ok(RawTransaction::call(owner, [0x11; 20], vec![active as u8]))
        }
    }

    fn gate(active: bool) -> ConsentGate<FakeRegistry> {
        let registry = FakeRegistry::default();
        registry.flags.lock().insert(RECORD, active);
        ConsentGate::new(registry)
    }

    #[tokio::test]
    async fn test_is_active_reads_registry_every_time() {
        let gate = gate(true);
        assert!(gate.is_active(&RECORD).await.unwrap());

        gate.registry.flags.lock().insert(RECORD, false);
        assert!(!gate.is_active(&RECORD).await.unwrap());
        assert_eq!(gate.last_observed(&RECORD), Some(false));
    }

    #[tokio::test]
    async fn test_owner_gets_toggle_transaction() {
        let tx = gate(true).set(&RECORD, OWNER, false).await.unwrap();
        assert_eq!(tx.from, Some(OWNER));
        assert_eq!(tx.data, vec![0]);
    }

    #[tokio::test]
    async fn test_non_owner_refused() {
        let err = gate(true).set(&RECORD, [0xBB; 20], false).await.unwrap_err();
        assert_eq!(err, ConsentError::NotOwner { record_id: RECORD });
    }

    #[tokio::test]
    async fn test_unknown_record() {
        let err = gate(true).is_active(&RecordId([9; 32])).await.unwrap_err();
        assert_eq!(err, ConsentError::UnknownRecord(RecordId([9; 32])));
    }
}
