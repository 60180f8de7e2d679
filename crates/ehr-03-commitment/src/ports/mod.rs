//! # Ports Layer
//!
//! The commitment manager has no inbound trait: callers hold the concrete
//! `CommitmentManager` together with the `RecordLifecycle` they drive.

pub mod outbound;
