//! # Domain Layer

pub mod entities;
pub mod errors;
pub mod lifecycle;
pub mod nonce;
pub mod typed_data;
pub mod verify;
