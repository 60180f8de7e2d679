//! # Service Container
//!
//! Shared collaborators for one deployment, and per-session wiring of the
//! protocol components on top of them.
//!
//! ```text
//! Deployment ── config, clock, content store, ledger
//!     │
//!     └── login(wallet, role, keys) ──► Participant
//!             session ─┬─ TransactionBroker  (wallet)
//!                      ├─ ConsentGate        (ledger)
//!                      ├─ CommitmentManager  (encryptor, store, committer, ledger, consent)
//!                      ├─ CapabilityProtocol (wallet, ledger, consent, clock)
//!                      └─ RequestLedger      (ledger, capability book, clock)
//! ```

pub mod config;
pub mod services;

pub use config::{ConfigError, EhrConfig};
pub use services::{generate_record_keys, Deployment, Participant};
