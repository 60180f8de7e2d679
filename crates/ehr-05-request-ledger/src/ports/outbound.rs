//! # Outbound Ports

use crate::domain::ViewerRole;
use ehr_04_capability::{AccessRequest, CapabilityProtocol};
use shared_types::Address;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Registry listing of requests by requester or by owner.
#[async_trait::async_trait]
pub trait RequestDirectory: Send + Sync {
    async fn requests_for(
        &self,
        identity: Address,
        role: ViewerRole,
    ) -> Result<Vec<AccessRequest>, DirectoryError>;
}

#[async_trait::async_trait]
impl<T: RequestDirectory + ?Sized> RequestDirectory for Arc<T> {
    async fn requests_for(
        &self,
        identity: Address,
        role: ViewerRole,
    ) -> Result<Vec<AccessRequest>, DirectoryError> {
        (**self).requests_for(identity, role).await
    }
}

/// Requests known only to this session so far.
pub trait LocalRequests: Send + Sync {
    fn local_requests(&self) -> Vec<AccessRequest>;
}

impl LocalRequests for CapabilityProtocol {
    fn local_requests(&self) -> Vec<AccessRequest> {
        CapabilityProtocol::local_requests(self)
    }
}
