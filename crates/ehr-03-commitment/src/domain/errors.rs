//! # Commitment Errors
//!
//! Every error names the lifecycle stage it came from, so a caller can retry
//! from that stage instead of starting over.

use ehr_02_consent_gate::ConsentError;
use shared_types::RecordId;
use std::fmt;
use thiserror::Error;

/// Lifecycle stage an operation belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Validation before any collaborator call
    Input,
    Encrypt,
    Upload,
    Commit,
    Persist,
    Confirm,
    Redact,
    Consent,
    Identity,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::Encrypt => "encrypt",
            Stage::Upload => "upload",
            Stage::Commit => "commit",
            Stage::Persist => "persist",
            Stage::Confirm => "confirm",
            Stage::Redact => "redact",
            Stage::Consent => "consent",
            Stage::Identity => "identity",
        };
        f.write_str(name)
    }
}

/// Commitment lifecycle errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommitmentError {
    /// A required input is absent; nothing was sent anywhere.
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    /// A step was invoked before its predecessor completed.
    #[error("Step `{attempted}` is not allowed while the record is {current}")]
    OutOfOrder {
        attempted: Stage,
        current: &'static str,
    },

    /// The encryptor failed.
    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    /// The content store is unreachable or refused the blob.
    #[error("Content store unavailable: {0}")]
    StoreUnavailable(String),

    /// The commitment collaborator failed.
    #[error("Commitment failed: {0}")]
    CommitmentFailed(String),

    /// The registry refused to anchor or the ledger does not reflect it.
    #[error("Anchoring failed: {0}")]
    AnchorError(String),

    /// The ledger does not reflect the persisted record.
    #[error("Not confirmed on the ledger: {0}")]
    NotConfirmed(String),

    /// The registry refused the redaction proof.
    #[error("Redaction rejected: {0}")]
    RedactionError(String),

    /// The session does not own the record it is acting on.
    #[error("Record {record_id} belongs to another identity")]
    ForeignRecord { record_id: RecordId },

    /// A patient session tried to originate a record for someone else.
    #[error("Only a custodian may originate records for another identity")]
    ForeignOwner,

    /// Identity registration was refused.
    #[error("Identity registration failed: {0}")]
    IdentityError(String),

    /// Consent toggle failed.
    #[error(transparent)]
    Consent(#[from] ConsentError),
}

impl CommitmentError {
    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            CommitmentError::MissingInput(_)
            | CommitmentError::ForeignRecord { .. }
            | CommitmentError::ForeignOwner => Stage::Input,
            CommitmentError::OutOfOrder { attempted, .. } => *attempted,
            CommitmentError::EncryptionError(_) => Stage::Encrypt,
            CommitmentError::StoreUnavailable(_) => Stage::Upload,
            CommitmentError::CommitmentFailed(_) => Stage::Commit,
            CommitmentError::AnchorError(_) => Stage::Persist,
            CommitmentError::NotConfirmed(_) => Stage::Confirm,
            CommitmentError::RedactionError(_) => Stage::Redact,
            CommitmentError::IdentityError(_) => Stage::Identity,
            CommitmentError::Consent(_) => Stage::Consent,
        }
    }
}
