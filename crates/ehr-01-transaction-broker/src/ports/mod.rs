//! # Ports Layer
//!
//! - **Inbound (Driving)**: `TransactionBrokerApi`
//! - **Outbound (Driven)**: `WalletBroadcaster`

pub mod inbound;
pub mod outbound;
