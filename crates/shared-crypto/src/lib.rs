//! # Shared Crypto - Protocol Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256, SHA-256, HMAC-SHA256 | Digests, record ids, bearer tokens |
//! | `ecdsa` | secp256k1 | Recoverable typed-data signatures |
//! | `symmetric` | AES-256-GCM | Framed payload cipher |
//! | `ecies` | secp256k1 ECDH + AES-256-GCM | Sealing a blob to a public key |
//! | `chameleon` | secp256k1 chameleon hash | Redactable record commitments |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - **AES-GCM**: 96-bit random nonce per message, authenticated
//! - **Chameleon hash**: collisions computable only with the trapdoor scalar

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chameleon;
pub mod ecdsa;
pub mod ecies;
pub mod errors;
pub mod hashing;
pub mod symmetric;

// Re-exports
pub use chameleon::{ChameleonHash, ChameleonWitness};
pub use ecdsa::{recover_address, RecoverableSignature, Secp256k1KeyPair};
pub use errors::CryptoError;
pub use hashing::{hmac_sha256, keccak256, sha256};
pub use symmetric::PayloadKey;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
