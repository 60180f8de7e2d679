//! # Transaction Broker Service
//!
//! Implements `TransactionBrokerApi` over an injected `WalletBroadcaster`.
//!
//! Each submission is tracked by its submission key:
//!
//! ```text
//! (absent) ──submit──► InFlight ──ok──► Confirmed   (resubmit returns the same hash)
//!                         │
//!                         └──err──► Failed          (resubmit sends the identical descriptor)
//! ```
//!
//! A submission that is `InFlight` cannot be submitted again; the caller must
//! wait for it to resolve.

use crate::domain::entities::{BroadcastState, BrokerConfig, CanonicalTransaction};
use crate::domain::errors::BrokerError;
use crate::domain::normalize;
use crate::ports::inbound::TransactionBrokerApi;
use crate::ports::outbound::{WalletBroadcaster, WalletError};
use ehr_telemetry::log_event;
use parking_lot::Mutex;
use shared_types::{Hash, RawTransaction};
use std::collections::HashMap;

const COMPONENT: &str = "transaction-broker";

/// Transaction Broker Service.
pub struct TransactionBroker<W: WalletBroadcaster> {
    wallet: W,
    config: BrokerConfig,
    submissions: Mutex<HashMap<Hash, BroadcastState>>,
}

impl<W: WalletBroadcaster> TransactionBroker<W> {
    /// Create a broker over `wallet`.
    pub fn new(wallet: W, config: BrokerConfig) -> Self {
        Self {
            wallet,
            config,
            submissions: Mutex::new(HashMap::new()),
        }
    }

    /// The broker's configuration.
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Claim the key for a send, or short-circuit on a known outcome.
    fn begin(&self, key: Hash) -> Result<Option<Hash>, BrokerError> {
        let mut submissions = self.submissions.lock();
        match submissions.get(&key) {
            Some(BroadcastState::Confirmed { tx_hash }) => Ok(Some(*tx_hash)),
            Some(BroadcastState::InFlight) => Err(BrokerError::AlreadyInFlight {
                key: hex_key(&key),
            }),
            Some(BroadcastState::Failed { .. }) | None => {
                submissions.insert(key, BroadcastState::InFlight);
                Ok(None)
            }
        }
    }

    fn finish(&self, key: Hash, state: BroadcastState) {
        self.submissions.lock().insert(key, state);
    }
}

#[async_trait::async_trait]
impl<W: WalletBroadcaster> TransactionBrokerApi for TransactionBroker<W> {
    fn normalize(&self, raw: &RawTransaction) -> Result<CanonicalTransaction, BrokerError> {
        normalize::normalize(raw, &self.config)
    }

    #[tracing::instrument(skip_all, fields(tx_key = tracing::field::Empty))]
    async fn submit(&self, tx: &CanonicalTransaction) -> Result<Hash, BrokerError> {
        let key = tx.submission_key();
        tracing::Span::current().record("tx_key", hex_key(&key).as_str());

        if let Some(tx_hash) = self.begin(key)? {
            log_event!(debug, COMPONENT, "Descriptor already broadcast, returning recorded hash");
            return Ok(tx_hash);
        }

        match self.wallet.send_transaction(tx).await {
            Ok(tx_hash) => {
                self.finish(key, BroadcastState::Confirmed { tx_hash });
                log_event!(info, COMPONENT, "Transaction broadcast", tx_hash = %hex_key(&tx_hash));
                Ok(tx_hash)
            }
            Err(WalletError::Rejected) => {
                self.finish(
                    key,
                    BroadcastState::Failed {
                        reason: "rejected by user".into(),
                    },
                );
                log_event!(warn, COMPONENT, "Transaction rejected in wallet");
                Err(BrokerError::UserRejected)
            }
            Err(WalletError::Failed(reason)) => {
                self.finish(
                    key,
                    BroadcastState::Failed {
                        reason: reason.clone(),
                    },
                );
                log_event!(warn, COMPONENT, "Transaction broadcast failed", reason = %reason);
                Err(BrokerError::BroadcastError(reason))
            }
        }
    }

    fn state_of(&self, key: &Hash) -> Option<BroadcastState> {
        self.submissions.lock().get(key).cloned()
    }
}

fn hex_key(key: &Hash) -> String {
    format!("0x{}", hex::encode(key))
}
