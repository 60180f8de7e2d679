//! # Capability Protocol Service
//!
//! Drives one session's side of the access-request protocol. Local checks
//! (consent, signature, nonce, expiry) run first so a doomed request never
//! costs a wallet prompt or a registry round trip; the registry repeats all
//! of them authoritatively.

use crate::domain::entities::{
    AccessRequest, CapabilityToken, ReplayKey, RequestId, Role, SignedAccessRequest,
    UnsignedAccessRequest,
};
use crate::domain::errors::CapabilityError;
use crate::domain::lifecycle::{ensure_owner_decision, ensure_requester_cancel};
use crate::domain::nonce::NonceSource;
use crate::domain::typed_data::TypedDataDomain;
use crate::domain::verify::verify_signed;
use crate::ports::inbound::CapabilityApi;
use crate::ports::outbound::{AccessRegistry, AccessRegistryError, SignerError, TypedDataSigner};
use ehr_02_consent_gate::ConsentGateApi;
use ehr_telemetry::{log_event, log_request_event};
use parking_lot::RwLock;
use shared_types::{Address, RawTransaction, RecordId, ReplayGuard, Session, TimeSource};
use std::collections::HashMap;
use std::sync::Arc;

const COMPONENT: &str = "capability";

/// Collaborators the protocol drives.
#[derive(Clone)]
pub struct CapabilityPorts {
    pub signer: Arc<dyn TypedDataSigner>,
    pub registry: Arc<dyn AccessRegistry>,
    pub consent: Arc<dyn ConsentGateApi>,
    pub clock: Arc<dyn TimeSource>,
}

/// Capability protocol bound to one session.
pub struct CapabilityProtocol {
    session: Arc<Session>,
    domain: TypedDataDomain,
    ports: CapabilityPorts,
    nonces: NonceSource,
    replay: ReplayGuard<ReplayKey>,
    /// Requests this session submitted, as last acknowledged by the registry.
    submitted: RwLock<HashMap<RequestId, AccessRequest>>,
}

impl CapabilityProtocol {
    pub fn new(session: Arc<Session>, ports: CapabilityPorts) -> Self {
        let domain = TypedDataDomain::from_network(session.network());
        Self {
            session,
            domain,
            ports,
            nonces: NonceSource::new(),
            replay: ReplayGuard::new(),
            submitted: RwLock::new(HashMap::new()),
        }
    }

    pub fn domain(&self) -> &TypedDataDomain {
        &self.domain
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Requests submitted from this session.
    pub fn local_requests(&self) -> Vec<AccessRequest> {
        self.submitted.read().values().cloned().collect()
    }

    /// Authoritative view of one request.
    pub async fn request(&self, id: &RequestId) -> Result<AccessRequest, CapabilityError> {
        self.ports
            .registry
            .request(id)
            .await
            .map_err(|e| map_registry_error(e, id))
    }

    async fn ensure_consent(&self, record_id: &RecordId) -> Result<(), CapabilityError> {
        if self.ports.consent.is_active(record_id).await? {
            Ok(())
        } else {
            Err(CapabilityError::ConsentDenied {
                record_id: *record_id,
            })
        }
    }
}

#[async_trait::async_trait]
impl CapabilityApi for CapabilityProtocol {
    fn build_request(
        &self,
        owner: Address,
        record_id: RecordId,
        role: Role,
        ttl: u64,
    ) -> Result<UnsignedAccessRequest, CapabilityError> {
        if record_id.is_zero() {
            return Err(CapabilityError::MissingInput("record_id"));
        }
        if ttl == 0 {
            return Err(CapabilityError::MissingInput("ttl"));
        }
        let timestamp = self.ports.clock.now();
        Ok(UnsignedAccessRequest {
            requester: self.session.identity(),
            owner,
            record_id,
            role,
            timestamp,
            nonce: self.nonces.next(timestamp),
            ttl,
        })
    }

    #[tracing::instrument(skip_all, fields(record_id = %request.record_id))]
    async fn sign(&self, request: UnsignedAccessRequest) -> Result<SignedAccessRequest, CapabilityError> {
        if self.ports.signer.address() != request.requester {
            return Err(CapabilityError::Forbidden("signer is not the requester"));
        }
        let signature = self
            .ports
            .signer
            .sign_typed(&self.domain, &request)
            .await
            .map_err(|e| match e {
                SignerError::Rejected => CapabilityError::UserRejected,
                SignerError::Failed(reason) => CapabilityError::Collaborator(reason),
            })?;
        Ok(SignedAccessRequest { request, signature })
    }

    #[tracing::instrument(skip_all, fields(record_id = %signed.request.record_id))]
    async fn submit(
        &self,
        signed: SignedAccessRequest,
    ) -> Result<(AccessRequest, Option<RawTransaction>), CapabilityError> {
        self.ensure_consent(&signed.request.record_id).await?;
        let id = verify_signed(&self.domain, &signed)?;

        let key = signed.request.replay_key();
        if !self.replay.check_and_insert(key) {
            log_request_event!(warn, COMPONENT, "Nonce reuse refused", id);
            return Err(CapabilityError::NonceReused);
        }

        let (request, tx) = match self.ports.registry.submit_request(&signed).await {
            Ok(accepted) => accepted,
            Err(AccessRegistryError::NonceReused) => return Err(CapabilityError::NonceReused),
            Err(e) => {
                // nothing was admitted, so the nonce may be retried
                self.replay.release(&key);
                return Err(map_decision_error(e, &id, &signed.request.record_id));
            }
        };

        self.submitted.write().insert(request.id, request.clone());
        log_request_event!(info, COMPONENT, "Access request submitted", request.id, expiry = request.expiry());
        Ok((request, tx))
    }

    async fn request_access(
        &self,
        owner: Address,
        record_id: RecordId,
        role: Role,
        ttl: u64,
    ) -> Result<(AccessRequest, Option<RawTransaction>), CapabilityError> {
        self.ensure_consent(&record_id).await?;
        let unsigned = self.build_request(owner, record_id, role, ttl)?;
        let signed = self.sign(unsigned).await?;
        self.submit(signed).await
    }

    #[tracing::instrument(skip_all, fields(request_id = %id))]
    async fn approve(&self, id: &RequestId) -> Result<(CapabilityToken, RawTransaction), CapabilityError> {
        let caller = self.session.identity();
        let current = self.request(id).await?;
        ensure_owner_decision(&current, caller, self.ports.clock.now())?;
        self.ensure_consent(&current.record_id()).await?;

        let (token, tx) = self
            .ports
            .registry
            .approve(id, caller)
            .await
            .map_err(|e| map_decision_error(e, id, &current.record_id()))?;

        log_request_event!(info, COMPONENT, "Approval prepared", id, expiry = token.expiry);
        Ok((token, tx))
    }

    #[tracing::instrument(skip_all, fields(request_id = %id))]
    async fn reject(&self, id: &RequestId) -> Result<RawTransaction, CapabilityError> {
        let caller = self.session.identity();
        let current = self.request(id).await?;
        ensure_owner_decision(&current, caller, self.ports.clock.now())?;

        let tx = self
            .ports
            .registry
            .reject(id, caller)
            .await
            .map_err(|e| map_registry_error(e, id))?;
        log_request_event!(info, COMPONENT, "Rejection prepared", id);
        Ok(tx)
    }

    #[tracing::instrument(skip_all, fields(request_id = %id))]
    async fn cancel(&self, id: &RequestId) -> Result<RawTransaction, CapabilityError> {
        let caller = self.session.identity();
        let current = self.request(id).await?;
        ensure_requester_cancel(&current, caller, self.ports.clock.now())?;

        let tx = self
            .ports
            .registry
            .cancel(id, caller)
            .await
            .map_err(|e| map_registry_error(e, id))?;
        log_request_event!(info, COMPONENT, "Cancellation prepared", id);
        Ok(tx)
    }

    #[tracing::instrument(skip_all, fields(request_id = %token.request_id))]
    async fn view(&self, token: &CapabilityToken) -> Result<Vec<u8>, CapabilityError> {
        if token.is_expired(self.ports.clock.now()) {
            log_event!(debug, COMPONENT, "Expired token refused locally");
            return Err(CapabilityError::TokenExpired);
        }
        self.ports
            .registry
            .view(token)
            .await
            .map_err(|e| map_registry_error(e, &token.request_id))
    }
}

fn map_decision_error(error: AccessRegistryError, id: &RequestId, record_id: &RecordId) -> CapabilityError {
    match error {
        AccessRegistryError::ConsentDenied => CapabilityError::ConsentDenied {
            record_id: *record_id,
        },
        other => map_registry_error(other, id),
    }
}

fn map_registry_error(error: AccessRegistryError, id: &RequestId) -> CapabilityError {
    match error {
        AccessRegistryError::ConsentDenied => CapabilityError::Forbidden("consent not active"),
        AccessRegistryError::InvalidSignature(reason) => CapabilityError::InvalidSignature(reason),
        AccessRegistryError::NonceReused => CapabilityError::NonceReused,
        AccessRegistryError::Forbidden(_) => CapabilityError::Forbidden("registry refused the caller"),
        AccessRegistryError::InvalidState(current) => CapabilityError::InvalidState { current },
        AccessRegistryError::NotFound => CapabilityError::UnknownRequest(*id),
        AccessRegistryError::TokenExpired => CapabilityError::TokenExpired,
        AccessRegistryError::TokenInvalid => CapabilityError::TokenInvalid,
        AccessRegistryError::Unavailable(reason) => CapabilityError::Collaborator(reason),
    }
}
