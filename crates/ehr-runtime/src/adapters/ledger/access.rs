//! Access-request registry side of the ledger.

use super::{InMemoryLedger, LedgerState, Operation};
use ehr_04_capability::{
    effective_status, is_expired, verify_signed, AccessRegistry, AccessRegistryError, AccessRequest,
    CapabilityToken, RequestId, RequestStatus, SignedAccessRequest,
};
use ehr_05_request_ledger::{DirectoryError, RequestDirectory, ViewerRole};
use ehr_telemetry::log_request_event;
use shared_types::{Address, RawTransaction};

const COMPONENT: &str = "ledger";

impl InMemoryLedger {
    /// Request with the ledger clock's expiry applied.
    fn current(&self, state: &LedgerState, id: &RequestId) -> Result<AccessRequest, AccessRegistryError> {
        let mut request = state
            .requests
            .get(id)
            .cloned()
            .ok_or(AccessRegistryError::NotFound)?;
        request.status = effective_status(&request, self.clock.now());
        Ok(request)
    }

    fn pending_for(
        &self,
        state: &LedgerState,
        id: &RequestId,
        caller: Address,
        counterparty: fn(&AccessRequest) -> Address,
    ) -> Result<AccessRequest, AccessRegistryError> {
        let request = self.current(state, id)?;
        if counterparty(&request) != caller {
            return Err(AccessRegistryError::Forbidden("caller is not the counterparty".into()));
        }
        if request.status != RequestStatus::Pending {
            return Err(AccessRegistryError::InvalidState(request.status));
        }
        Ok(request)
    }
}

#[async_trait::async_trait]
impl AccessRegistry for InMemoryLedger {
    async fn submit_request(
        &self,
        signed: &SignedAccessRequest,
    ) -> Result<(AccessRequest, Option<RawTransaction>), AccessRegistryError> {
        let id = verify_signed(&self.domain, signed)
            .map_err(|e| AccessRegistryError::InvalidSignature(e.to_string()))?;
        let fields = &signed.request;

        let mut state = self.state.lock();
        let record = state
            .records
            .get(&fields.record_id)
            .ok_or(AccessRegistryError::NotFound)?;
        if record.descriptor.owner != fields.owner {
            return Err(AccessRegistryError::Forbidden("owner does not own the record".into()));
        }
        if !record.consent_active {
            return Err(AccessRegistryError::ConsentDenied);
        }
        if is_expired(fields.timestamp, fields.ttl, self.clock.now()) {
            return Err(AccessRegistryError::InvalidState(RequestStatus::Expired));
        }
        if !self.replay.check_and_insert(fields.replay_key()) {
            return Err(AccessRegistryError::NonceReused);
        }

        let request = AccessRequest {
            id,
            request: fields.clone(),
            signature: signed.signature,
            status: RequestStatus::Pending,
        };
        state.requests.insert(id, request.clone());
        log_request_event!(info, COMPONENT, "Access request registered", id);
        Ok((request, None))
    }

    async fn request(&self, id: &RequestId) -> Result<AccessRequest, AccessRegistryError> {
        self.current(&self.state.lock(), id)
    }

    async fn approve(
        &self,
        id: &RequestId,
        owner: Address,
    ) -> Result<(CapabilityToken, RawTransaction), AccessRegistryError> {
        let mut state = self.state.lock();
        let request = self.pending_for(&state, id, owner, AccessRequest::owner)?;
        if !state
            .records
            .get(&request.record_id())
            .is_some_and(|r| r.consent_active)
        {
            return Err(AccessRegistryError::ConsentDenied);
        }

        let bearer = self
            .bearer_for(id)
            .map_err(|e| AccessRegistryError::Unavailable(e.to_string()))?;
        let token = CapabilityToken {
            request_id: *id,
            record_id: request.record_id(),
            expiry: request.expiry(),
            bearer,
        };
        let tx = self.queue(&mut state, owner, Operation::Approve(*id));
        Ok((token, tx))
    }

    async fn reject(&self, id: &RequestId, owner: Address) -> Result<RawTransaction, AccessRegistryError> {
        let mut state = self.state.lock();
        self.pending_for(&state, id, owner, AccessRequest::owner)?;
        Ok(self.queue(&mut state, owner, Operation::Reject(*id)))
    }

    async fn cancel(
        &self,
        id: &RequestId,
        requester: Address,
    ) -> Result<RawTransaction, AccessRegistryError> {
        let mut state = self.state.lock();
        self.pending_for(&state, id, requester, AccessRequest::requester)?;
        Ok(self.queue(&mut state, requester, Operation::Cancel(*id)))
    }

    async fn view(&self, token: &CapabilityToken) -> Result<Vec<u8>, AccessRegistryError> {
        let content_address = {
            let state = self.state.lock();
            let request = state
                .requests
                .get(&token.request_id)
                .ok_or(AccessRegistryError::TokenInvalid)?;
            let expected = self
                .bearer_for(&token.request_id)
                .map_err(|e| AccessRegistryError::Unavailable(e.to_string()))?;
            if expected != token.bearer || request.record_id() != token.record_id {
                return Err(AccessRegistryError::TokenInvalid);
            }
            let now = self.clock.now();
            if token.is_expired(now) || effective_status(request, now) == RequestStatus::Expired {
                return Err(AccessRegistryError::TokenExpired);
            }
            if request.status != RequestStatus::Approved {
                return Err(AccessRegistryError::TokenInvalid);
            }
            state
                .records
                .get(&token.record_id)
                .map(|r| r.descriptor.content_address.clone())
                .ok_or(AccessRegistryError::TokenInvalid)?
        };

        self.store
            .get(&content_address)
            .ok_or_else(|| AccessRegistryError::Unavailable(format!("blob {content_address} missing")))
    }
}

#[async_trait::async_trait]
impl RequestDirectory for InMemoryLedger {
    async fn requests_for(
        &self,
        identity: Address,
        role: ViewerRole,
    ) -> Result<Vec<AccessRequest>, DirectoryError> {
        let state = self.state.lock();
        let now = self.clock.now();
        Ok(state
            .requests
            .values()
            .filter(|r| role.matches(r, identity))
            .map(|r| AccessRequest {
                status: effective_status(r, now),
                ..r.clone()
            })
            .collect())
    }
}
