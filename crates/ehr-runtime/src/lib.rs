//! # EHR Vault Runtime
//!
//! Wires the protocol components to in-process collaborators: a content
//! store, a ledger holding the record and access registries, and a local
//! wallet per participant.
//!
//! ## Modular Structure
//!
//! - `adapters/` - Collaborator implementations (store, ledger, wallet, crypto)
//! - `container/` - Configuration and per-session wiring
//! - `walkthrough` - The create → share → redact flow driven by the binary
//!
//! Nothing a component returns is final until the matching transaction
//! has been broadcast through the wallet and executed by the ledger.

pub mod adapters;
pub mod container;
pub mod walkthrough;

pub use container::{generate_record_keys, ConfigError, Deployment, EhrConfig, Participant};
