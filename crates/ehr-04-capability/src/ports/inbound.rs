//! # Inbound Ports

use crate::domain::entities::{
    AccessRequest, CapabilityToken, RequestId, Role, SignedAccessRequest, UnsignedAccessRequest,
};
use crate::domain::errors::CapabilityError;
use shared_types::{Address, RawTransaction, RecordId};

/// Capability protocol API, bound to one session.
#[async_trait::async_trait]
pub trait CapabilityApi: Send + Sync {
    /// Build an unsigned request from the session identity to `owner`.
    ///
    /// Nonce and timestamp are filled in; `ttl` is the caller's.
    fn build_request(
        &self,
        owner: Address,
        record_id: RecordId,
        role: Role,
        ttl: u64,
    ) -> Result<UnsignedAccessRequest, CapabilityError>;

    /// Sign through the injected signer.
    async fn sign(&self, request: UnsignedAccessRequest) -> Result<SignedAccessRequest, CapabilityError>;

    /// Submit a signed request.
    ///
    /// # Errors
    /// * `ConsentDenied` - consent for the record is off
    /// * `InvalidSignature` - the signature does not verify
    /// * `NonceReused` - the replay key was already admitted
    async fn submit(
        &self,
        signed: SignedAccessRequest,
    ) -> Result<(AccessRequest, Option<RawTransaction>), CapabilityError>;

    /// Consent check, build, sign, submit.
    async fn request_access(
        &self,
        owner: Address,
        record_id: RecordId,
        role: Role,
        ttl: u64,
    ) -> Result<(AccessRequest, Option<RawTransaction>), CapabilityError>;

    async fn approve(&self, id: &RequestId) -> Result<(CapabilityToken, RawTransaction), CapabilityError>;

    async fn reject(&self, id: &RequestId) -> Result<RawTransaction, CapabilityError>;

    async fn cancel(&self, id: &RequestId) -> Result<RawTransaction, CapabilityError>;

    /// Fetch the record's ciphertext with a capability token.
    async fn view(&self, token: &CapabilityToken) -> Result<Vec<u8>, CapabilityError>;
}
