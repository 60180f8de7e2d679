//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::entities::CanonicalTransaction;
use shared_types::Hash;
use thiserror::Error;

/// Error from the wallet.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    /// The user declined
    #[error("Rejected by user")]
    Rejected,

    /// Signing or broadcasting failed
    #[error("Broadcast failed: {0}")]
    Failed(String),
}

/// The injected signer/broadcaster.
///
/// Suspends until the user approves or rejects.
#[async_trait::async_trait]
pub trait WalletBroadcaster: Send + Sync {
    /// Sign and broadcast, returning the transaction hash.
    async fn send_transaction(&self, tx: &CanonicalTransaction) -> Result<Hash, WalletError>;
}

#[async_trait::async_trait]
impl<T: WalletBroadcaster + ?Sized> WalletBroadcaster for std::sync::Arc<T> {
    async fn send_transaction(&self, tx: &CanonicalTransaction) -> Result<Hash, WalletError> {
        (**self).send_transaction(tx).await
    }
}
