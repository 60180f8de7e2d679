//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::{BroadcastState, CanonicalTransaction};
use crate::domain::errors::BrokerError;
use shared_types::{Hash, RawTransaction};

/// Primary Transaction Broker API.
#[async_trait::async_trait]
pub trait TransactionBrokerApi: Send + Sync {
    /// Normalize a raw descriptor under the broker's configuration.
    fn normalize(&self, raw: &RawTransaction) -> Result<CanonicalTransaction, BrokerError>;

    /// Submit through the wallet and wait for its answer.
    ///
    /// # Errors
    /// * `UserRejected` - declined in the wallet
    /// * `BroadcastError` - the wallet or network failed
    /// * `AlreadyInFlight` - the identical descriptor is still pending
    async fn submit(&self, tx: &CanonicalTransaction) -> Result<Hash, BrokerError>;

    /// Normalize then submit.
    async fn submit_raw(&self, raw: &RawTransaction) -> Result<Hash, BrokerError> {
        let tx = self.normalize(raw)?;
        self.submit(&tx).await
    }

    /// Current state of a submission, by submission key.
    fn state_of(&self, key: &Hash) -> Option<BroadcastState>;
}
