//! # Capability Errors

use super::entities::{RequestId, RequestStatus};
use ehr_02_consent_gate::ConsentError;
use shared_types::RecordId;
use thiserror::Error;

/// Capability protocol errors.
///
/// Authorization and integrity failures are terminal for the attempt and
/// never downgraded to a different status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    // =========================================================================
    // Input
    // =========================================================================
    /// A required input is absent.
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    // =========================================================================
    // Authorization
    // =========================================================================
    /// Consent for the record is off.
    #[error("Consent is not active for record {record_id}")]
    ConsentDenied { record_id: RecordId },

    /// The caller is not the counterparty this transition requires.
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    /// The transition is not allowed from the current status.
    #[error("Request is {current}, expected pending")]
    InvalidState { current: RequestStatus },

    /// The token's expiry has passed.
    #[error("Capability token expired")]
    TokenExpired,

    /// The token is unknown or its approval is not on the ledger.
    #[error("Capability token invalid")]
    TokenInvalid,

    // =========================================================================
    // Integrity / replay
    // =========================================================================
    /// Signature does not recover to the requester over the recomputed digest.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// The nonce was already used for this requester, owner and record.
    #[error("Nonce already used for this requester, owner and record")]
    NonceReused,

    // =========================================================================
    // Collaborators
    // =========================================================================
    /// The user declined in the signer.
    #[error("User rejected the signature request")]
    UserRejected,

    /// The registry has no such request.
    #[error("Unknown request {0}")]
    UnknownRequest(RequestId),

    /// The registry or signer failed.
    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    /// Reading the consent gate failed.
    #[error(transparent)]
    Consent(#[from] ConsentError),
}
