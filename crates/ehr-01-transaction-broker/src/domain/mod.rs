//! # Domain Layer
//!
//! Pure normalization logic with no I/O dependencies.

pub mod entities;
pub mod errors;
pub mod normalize;
