//! # Error Types
//!
//! Defines error types used across components.

use thiserror::Error;

/// Errors raised while validating collaborator payloads at the boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A required field is absent.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A hex field could not be decoded.
    #[error("Invalid hex in {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    /// A fixed-width field has the wrong length.
    #[error("Invalid length for {field}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A numeric quantity is not a number, decimal string or hex string.
    #[error("Invalid quantity: {value}")]
    InvalidQuantity { value: String },

    /// Content addresses must not be empty.
    #[error("Empty content address")]
    EmptyContentAddress,

    /// The payload does not match the declared schema.
    #[error("Schema violation: {0}")]
    Schema(String),
}
