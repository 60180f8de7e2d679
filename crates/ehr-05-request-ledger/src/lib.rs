//! # Request Ledger (EHR-05)
//!
//! Read model over access requests. Every `list` is a fresh full snapshot:
//! the registry's view of the identity's requests, merged with requests this
//! session submitted that the registry does not list yet.
//!
//! Local time may demote a status (`approved` shown as `expired` before the
//! registry says so) but never promote one.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{permissiveness, reconcile, EntrySource, LedgerEntry, LedgerError, ViewerRole};
pub use ports::inbound::RequestLedgerApi;
pub use ports::outbound::{DirectoryError, LocalRequests, RequestDirectory};
pub use service::RequestLedger;
