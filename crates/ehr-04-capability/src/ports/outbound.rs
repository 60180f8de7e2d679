//! # Outbound Ports
//!
//! The external signer and the access registry. The registry is the
//! authority: it re-verifies signatures, consent, nonces and expiry itself.

use crate::domain::entities::{
    AccessRequest, CapabilityToken, RequestId, RequestStatus, SignedAccessRequest,
    UnsignedAccessRequest,
};
use crate::domain::typed_data::TypedDataDomain;
use shared_crypto::RecoverableSignature;
use shared_types::{Address, RawTransaction};
use std::sync::Arc;
use thiserror::Error;

/// Error from the typed-data signer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("User rejected the signature request")]
    Rejected,

    #[error("Signer failed: {0}")]
    Failed(String),
}

/// Wallet capability that signs EIP-712 typed data.
#[async_trait::async_trait]
pub trait TypedDataSigner: Send + Sync {
    /// Identity the signer signs as.
    fn address(&self) -> Address;

    /// Sign `request` under `domain`. Suspends until the user decides.
    async fn sign_typed(
        &self,
        domain: &TypedDataDomain,
        request: &UnsignedAccessRequest,
    ) -> Result<RecoverableSignature, SignerError>;
}

#[async_trait::async_trait]
impl<T: TypedDataSigner + ?Sized> TypedDataSigner for Arc<T> {
    fn address(&self) -> Address {
        (**self).address()
    }

    async fn sign_typed(
        &self,
        domain: &TypedDataDomain,
        request: &UnsignedAccessRequest,
    ) -> Result<RecoverableSignature, SignerError> {
        (**self).sign_typed(domain, request).await
    }
}

/// Error from the access registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessRegistryError {
    #[error("Consent denied")]
    ConsentDenied,

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Nonce reused")]
    NonceReused,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Request is {0}")]
    InvalidState(RequestStatus),

    #[error("Request not found")]
    NotFound,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token invalid")]
    TokenInvalid,

    #[error("Registry unavailable: {0}")]
    Unavailable(String),
}

/// Registry of access requests and issued capabilities.
#[async_trait::async_trait]
pub trait AccessRegistry: Send + Sync {
    /// Register a signed request. Returns it as `Pending` plus the transaction
    /// that makes it durable, if the registry needs one.
    async fn submit_request(
        &self,
        signed: &SignedAccessRequest,
    ) -> Result<(AccessRequest, Option<RawTransaction>), AccessRegistryError>;

    /// Current stored view of a request.
    async fn request(&self, id: &RequestId) -> Result<AccessRequest, AccessRegistryError>;

    /// Owner approval. The token is usable once the transaction confirms.
    async fn approve(
        &self,
        id: &RequestId,
        owner: Address,
    ) -> Result<(CapabilityToken, RawTransaction), AccessRegistryError>;

    async fn reject(&self, id: &RequestId, owner: Address) -> Result<RawTransaction, AccessRegistryError>;

    async fn cancel(
        &self,
        id: &RequestId,
        requester: Address,
    ) -> Result<RawTransaction, AccessRegistryError>;

    /// Ciphertext of the token's record.
    async fn view(&self, token: &CapabilityToken) -> Result<Vec<u8>, AccessRegistryError>;
}

#[async_trait::async_trait]
impl<T: AccessRegistry + ?Sized> AccessRegistry for Arc<T> {
    async fn submit_request(
        &self,
        signed: &SignedAccessRequest,
    ) -> Result<(AccessRequest, Option<RawTransaction>), AccessRegistryError> {
        (**self).submit_request(signed).await
    }

    async fn request(&self, id: &RequestId) -> Result<AccessRequest, AccessRegistryError> {
        (**self).request(id).await
    }

    async fn approve(
        &self,
        id: &RequestId,
        owner: Address,
    ) -> Result<(CapabilityToken, RawTransaction), AccessRegistryError> {
        (**self).approve(id, owner).await
    }

    async fn reject(&self, id: &RequestId, owner: Address) -> Result<RawTransaction, AccessRegistryError> {
        (**self).reject(id, owner).await
    }

    async fn cancel(
        &self,
        id: &RequestId,
        requester: Address,
    ) -> Result<RawTransaction, AccessRegistryError> {
        (**self).cancel(id, requester).await
    }

    async fn view(&self, token: &CapabilityToken) -> Result<Vec<u8>, AccessRegistryError> {
        (**self).view(token).await
    }
}
