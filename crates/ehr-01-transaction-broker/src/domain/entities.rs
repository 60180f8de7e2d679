//! # Broker Entities

use serde::{Deserialize, Serialize};
use shared_crypto::keccak256;
use shared_types::{Address, Hash, Quantity, RawTransaction};

/// How to resolve fee fields on a descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeePolicy {
    /// Keep EIP-1559 fields when present, otherwise legacy.
    #[default]
    PreferPriorityFee,
    /// Keep the legacy gas price when present, otherwise EIP-1559.
    PreferLegacy,
    /// Strip every fee field and let the wallet price the transaction.
    DeferToWallet,
}

/// Broker settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BrokerConfig {
    pub fee_policy: FeePolicy,
    /// Gas limit applied when the descriptor carries none.
    pub default_gas: Option<u64>,
}

/// The single fee model a canonical transaction carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeModel {
    /// Pre-1559 `gasPrice`.
    Legacy { gas_price: Quantity },
    /// EIP-1559 fields; either may be left to the wallet.
    PriorityFee {
        max_fee_per_gas: Option<Quantity>,
        max_priority_fee_per_gas: Option<Quantity>,
    },
    /// No fee fields; the wallet estimates.
    WalletEstimated,
}

/// Normalized transaction, ready for the wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalTransaction {
    pub from: Option<Address>,
    pub to: Address,
    pub value: Quantity,
    pub gas: Option<Quantity>,
    pub fee: FeeModel,
    pub nonce: Option<Quantity>,
    pub chain_id: Option<Quantity>,
    pub data: Vec<u8>,
}

impl CanonicalTransaction {
    /// Wire form: minimal hex quantities, one fee model.
    pub fn to_wire(&self) -> RawTransaction {
        let (gas_price, max_fee_per_gas, max_priority_fee_per_gas) = match self.fee {
            FeeModel::Legacy { gas_price } => (Some(gas_price), None, None),
            FeeModel::PriorityFee {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => (None, max_fee_per_gas, max_priority_fee_per_gas),
            FeeModel::WalletEstimated => (None, None, None),
        };

        RawTransaction {
            from: self.from,
            to: Some(self.to),
            value: Some(self.value),
            gas: self.gas,
            gas_price,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            nonce: self.nonce,
            chain_id: self.chain_id,
            data: self.data.clone(),
        }
    }

    /// JSON wire encoding.
    pub fn to_json(&self) -> String {
        // Serializing plain strings and options cannot fail
        serde_json::to_string(&self.to_wire()).unwrap_or_default()
    }

    /// Stable identifier of this exact descriptor.
    ///
    /// Two submissions with the same key are the same transaction.
    pub fn submission_key(&self) -> Hash {
        keccak256(self.to_json().as_bytes())
    }
}

/// Where a submission stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BroadcastState {
    /// Handed to the wallet, awaiting its answer.
    InFlight,
    /// Broadcast; the hash is final for this descriptor.
    Confirmed { tx_hash: Hash },
    /// Declined or failed; the identical descriptor may be resubmitted.
    Failed { reason: String },
}
