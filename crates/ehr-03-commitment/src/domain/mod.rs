//! # Domain Layer
//!
//! The per-record state machine. No I/O.

pub mod entities;
pub mod errors;
pub mod lifecycle;
