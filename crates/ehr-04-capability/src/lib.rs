//! # Capability Protocol (EHR-04)
//!
//! A requester (doctor) asks a record owner (patient) for time-boxed access
//! to one record through an EIP-712 signed request:
//!
//! ```text
//!            ┌──approve (owner)──► Approved ──time──► Expired
//! Pending ───┼──reject (owner)───► Rejected
//!            ├──cancel (requester)► Cancelled
//!            └──time─────────────► Expired
//! ```
//!
//! Expiry is a pure function of `timestamp + ttl` against the clock and is
//! re-evaluated on every read. Every other transition requires the right
//! counterparty.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): typed-data encoding, verification, the request state machine
//! - **Ports Layer** (`ports/`): `CapabilityApi` (inbound); signer and access registry (outbound)
//! - **Service Layer** (`service.rs`): `CapabilityProtocol`
//!
//! ## Security Notes
//!
//! - The signing domain binds protocol name, version, chain id and verifying
//!   contract, so a signature cannot be replayed on another network or authority.
//! - Every field of the request is signed, `ttl` included. Any mutation fails verification.
//! - `(requester, owner, record, nonce)` is admitted at most once.
//! - Consent is checked before signing and again at submit and approve time;
//!   the registry re-checks all of it independently.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{
    AccessRequest, BearerToken, CapabilityToken, ReplayKey, RequestId, RequestStatus, Role,
    SignedAccessRequest, UnsignedAccessRequest,
};
pub use domain::errors::CapabilityError;
pub use domain::lifecycle::{effective_status, is_expired};
pub use domain::nonce::NonceSource;
pub use domain::typed_data::TypedDataDomain;
pub use domain::verify::verify_signed;
pub use ports::inbound::CapabilityApi;
pub use ports::outbound::{AccessRegistry, AccessRegistryError, SignerError, TypedDataSigner};
pub use service::{CapabilityPorts, CapabilityProtocol};
pub use shared_crypto::RecoverableSignature;
