//! # Broker Errors

use shared_types::ParseError;
use thiserror::Error;

/// Errors from normalization and submission.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrokerError {
    /// A required field is absent or unusable.
    #[error("Malformed transaction: missing or invalid `{field}`")]
    MalformedTransaction { field: &'static str },

    /// The collaborator payload did not parse.
    #[error("Malformed transaction payload: {0}")]
    Parse(#[from] ParseError),

    /// The user declined in the wallet.
    #[error("User rejected the transaction")]
    UserRejected,

    /// The wallet or network failed to broadcast.
    #[error("Broadcast failed: {0}")]
    BroadcastError(String),

    /// The identical descriptor is still awaiting the wallet.
    #[error("Transaction {key} is already in flight")]
    AlreadyInFlight { key: String },
}
