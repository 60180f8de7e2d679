//! Record and consent registry side of the ledger.

use super::{derive_record_id, opens, registered_key, InMemoryLedger, Operation};
use ehr_02_consent_gate::{ConsentRegistry, ConsentStatus, RegistryError};
use ehr_03_commitment::{CollaboratorError, RecordDescriptor, RecordRegistry, StoreRecord, UpdateRecord};
use shared_types::{Address, PublicKeyBytes, RawTransaction, RecordId};

#[async_trait::async_trait]
impl RecordRegistry for InMemoryLedger {
    async fn register_identity(
        &self,
        identity: Address,
        public_key: &PublicKeyBytes,
    ) -> Result<RawTransaction, CollaboratorError> {
        let mut state = self.state.lock();
        Ok(self.queue(
            &mut state,
            identity,
            Operation::RegisterIdentity {
                identity,
                public_key: *public_key,
            },
        ))
    }

    async fn store_record(
        &self,
        request: &StoreRecord,
    ) -> Result<(RecordId, RawTransaction), CollaboratorError> {
        let mut state = self.state.lock();
        let public_key = registered_key(&state, &request.owner).map_err(CollaboratorError::Rejected)?;
        if !opens(
            &public_key,
            &request.content_address,
            &request.witness,
            &request.commitment_hash.0,
        ) {
            return Err(CollaboratorError::Rejected(
                "commitment does not open under the owner's key".into(),
            ));
        }

        let record_id = derive_record_id(&request.content_address, &request.owner);
        if state.records.contains_key(&record_id) {
            return Err(CollaboratorError::Rejected("record already anchored".into()));
        }

        let descriptor = RecordDescriptor {
            record_id,
            content_address: request.content_address.clone(),
            commitment_hash: request.commitment_hash,
            witness: request.witness,
            owner: request.owner,
        };
        let tx = self.queue(&mut state, request.owner, Operation::StoreRecord(descriptor));
        Ok((record_id, tx))
    }

    async fn update_record(&self, request: &UpdateRecord) -> Result<RawTransaction, CollaboratorError> {
        let mut state = self.state.lock();
        if !state.records.contains_key(&request.record_id) {
            return Err(CollaboratorError::NotFound);
        }
        self.check_update(&state, request)
            .map_err(CollaboratorError::Rejected)?;
        Ok(self.queue(&mut state, request.owner, Operation::UpdateRecord(request.clone())))
    }

    async fn record(&self, record_id: &RecordId) -> Result<RecordDescriptor, CollaboratorError> {
        self.state
            .lock()
            .records
            .get(record_id)
            .map(|r| r.descriptor.clone())
            .ok_or(CollaboratorError::NotFound)
    }
}

#[async_trait::async_trait]
impl ConsentRegistry for InMemoryLedger {
    async fn consent_of(&self, record_id: &RecordId) -> Result<ConsentStatus, RegistryError> {
        self.state
            .lock()
            .records
            .get(record_id)
            .map(|r| ConsentStatus {
                owner: r.descriptor.owner,
                active: r.consent_active,
            })
            .ok_or(RegistryError::NotFound)
    }

    async fn toggle_consent(
        &self,
        record_id: &RecordId,
        owner: Address,
        active: bool,
    ) -> Result<RawTransaction, RegistryError> {
        let mut state = self.state.lock();
        let record = state.records.get(record_id).ok_or(RegistryError::NotFound)?;
        if record.descriptor.owner != owner {
            return Err(RegistryError::Forbidden("caller is not the record owner".into()));
        }
        Ok(self.queue(
            &mut state,
            owner,
            Operation::ToggleConsent {
                record_id: *record_id,
                active,
            },
        ))
    }
}
