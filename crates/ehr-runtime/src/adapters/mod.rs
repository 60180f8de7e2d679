//! # Reference Collaborators
//!
//! In-process implementations of every outbound port the protocol
//! components consume. They hold real cryptography (ECIES sealing, chameleon
//! commitments, recoverable signatures) and a ledger that only applies an
//! operation once its transaction has been broadcast.
//!
//! ```text
//!  CommitmentManager ──► EciesEncryptor, InMemoryContentStore, ChameleonCommitter
//!          │                                 │
//!          └──────────► InMemoryLedger ◄─────┴── ConsentGate, CapabilityProtocol,
//!                            ▲                    RequestLedger
//!                            │ execute
//!  TransactionBroker ──► LocalWallet
//! ```

pub mod content_store;
pub mod crypto;
pub mod ledger;
pub mod wallet;

pub use content_store::InMemoryContentStore;
pub use crypto::{ChameleonCommitter, EciesEncryptor};
pub use ledger::InMemoryLedger;
pub use wallet::LocalWallet;
