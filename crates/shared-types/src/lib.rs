//! # Shared Types Crate
//!
//! This crate contains all domain entities, the raw transaction descriptor and
//! the explicit `Session` context used by every protocol component.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-component types are defined here.
//! - **Typed Boundaries**: Collaborator payloads are parsed into explicit types;
//!   missing or unknown fields raise a `ParseError` instead of propagating
//!   half-filled values.
//! - **No Ambient State**: Identity, network binding and record keys travel in
//!   a `Session` handed to each component's constructor.

pub mod entities;
pub mod errors;
pub mod quantity;
pub mod security;
pub mod session;
pub mod time;
pub mod transaction;

pub use entities::*;
pub use errors::*;
pub use quantity::Quantity;
pub use security::ReplayGuard;
pub use session::{NetworkContext, RecordKeys, Session, SessionRole};
pub use time::{ManualClock, SystemTimeSource, TimeSource, Timestamp};
pub use transaction::RawTransaction;
