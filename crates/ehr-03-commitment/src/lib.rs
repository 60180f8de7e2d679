//! # Commitment Manager (EHR-03)
//!
//! Drives a record through its commitment lifecycle:
//!
//! ```text
//! Idle ──encrypt──► Draft ──anchor──► Uploaded ──commit──► Committed ──persist──► Persisted ──confirm──► Anchored
//!                                                                                                          │
//!   ▲                                redact: encrypt → anchor → commit (trapdoor) → persist                 │
//!   └──────────────────────────────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `Anchored` is durable. A redaction changes the content address and
//! the witness; the record id and the commitment hash never change.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): the lifecycle state machine and error taxonomy
//! - **Ports Layer** (`ports/`): encryptor, content store, commitment scheme, record registry
//! - **Service Layer** (`service.rs`): `CommitmentManager`, one collaborator call per step
//!
//! ## Ordering
//!
//! Steps of one record are strictly ordered. A step called out of order is
//! rejected with `OutOfOrder` before any collaborator is contacted, and a
//! failed step leaves the lifecycle where it was so the caller can retry
//! exactly that step.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{EncryptedBlob, RecordDescriptor};
pub use domain::errors::{CommitmentError, Stage};
pub use domain::lifecycle::{Phase, RecordLifecycle};
pub use ports::outbound::{
    CollaboratorError, CommitmentScheme, ContentStore, Encryptor, RecordRegistry, StoreRecord,
    UpdateRecord,
};
pub use service::{CommitmentManager, CommitmentPorts};
