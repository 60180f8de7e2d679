//! # Normalization
//!
//! Turns a collaborator's raw descriptor into a [`CanonicalTransaction`].

use super::entities::{BrokerConfig, CanonicalTransaction, FeeModel, FeePolicy};
use super::errors::BrokerError;
use shared_types::{Quantity, RawTransaction};

/// Normalize a raw descriptor under `config`.
///
/// # Errors
/// * `MalformedTransaction { field: "to" }` - no recipient
pub fn normalize(raw: &RawTransaction, config: &BrokerConfig) -> Result<CanonicalTransaction, BrokerError> {
    let to = raw
        .to
        .ok_or(BrokerError::MalformedTransaction { field: "to" })?;

    let gas = raw.gas.or_else(|| config.default_gas.map(Quantity::from));

    Ok(CanonicalTransaction {
        from: raw.from,
        to,
        value: raw.value.unwrap_or(Quantity::ZERO),
        gas,
        fee: resolve_fee(raw, config.fee_policy),
        nonce: raw.nonce,
        chain_id: raw.chain_id,
        data: raw.data.clone(),
    })
}

/// Parse a collaborator JSON payload and normalize it.
pub fn normalize_json(payload: &str, config: &BrokerConfig) -> Result<CanonicalTransaction, BrokerError> {
    let raw = RawTransaction::from_json(payload)?;
    normalize(&raw, config)
}

fn resolve_fee(raw: &RawTransaction, policy: FeePolicy) -> FeeModel {
    let legacy = raw.gas_price.map(|gas_price| FeeModel::Legacy { gas_price });
    let priority = raw.has_priority_fee().then_some(FeeModel::PriorityFee {
        max_fee_per_gas: raw.max_fee_per_gas,
        max_priority_fee_per_gas: raw.max_priority_fee_per_gas,
    });

    let chosen = match policy {
        FeePolicy::DeferToWallet => None,
        FeePolicy::PreferPriorityFee => priority.or(legacy),
        FeePolicy::PreferLegacy => legacy.or(priority),
    };
    chosen.unwrap_or(FeeModel::WalletEstimated)
}
