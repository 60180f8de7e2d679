//! # Transaction Broker (EHR-01)
//!
//! Boundary adapter between collaborator-produced transaction descriptors and
//! the user's wallet. It has no business logic: it normalizes a descriptor to
//! the wire encoding, forwards it to an injected broadcaster, and tracks each
//! submission so that a repeated submission never produces a second send.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): fee-model resolution and normalization, no I/O
//! - **Ports Layer** (`ports/`): `TransactionBrokerApi` (inbound), `WalletBroadcaster` (outbound)
//! - **Service Layer** (`service.rs`): submission bookkeeping over the wallet port
//!
//! ## Invariants
//!
//! - A normalized transaction carries exactly one fee model, or none when the
//!   wallet is left to price it. Never both.
//! - A descriptor without a recipient is rejected.
//! - The broker never changes a nonce and never retries on its own.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::entities::{BroadcastState, BrokerConfig, CanonicalTransaction, FeeModel, FeePolicy};
pub use domain::errors::BrokerError;
pub use domain::normalize::{normalize, normalize_json};
pub use ports::inbound::TransactionBrokerApi;
pub use ports::outbound::{WalletBroadcaster, WalletError};
pub use service::TransactionBroker;
