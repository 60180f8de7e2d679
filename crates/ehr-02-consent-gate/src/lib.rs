//! # Consent Gate (EHR-02)
//!
//! A boolean per record, owned by the record's patient, consulted before any
//! new capability grant. The gate itself holds no authority: every
//! `is_active` is a fresh read from the registry, and every `set` produces an
//! unsigned transaction that only takes effect once the owner broadcasts it.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{ConsentError, ConsentStatus};
pub use ports::inbound::ConsentGateApi;
pub use ports::outbound::{ConsentRegistry, RegistryError};
pub use service::ConsentGate;
