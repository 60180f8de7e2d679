//! # Runtime Configuration
//!
//! Loaded from an optional TOML file, then overridden from the environment,
//! then validated. Every section has defaults so an empty file is valid
//! apart from the checks in [`EhrConfig::validate`].
//!
//! ```toml
//! [network]
//! chain_id = 1337
//! verifying_contract = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
//!
//! [capability]
//! default_ttl_ms = 600000
//!
//! [broker]
//! fee_policy = "prefer_priority_fee"
//! ```

use ehr_01_transaction_broker::{BrokerConfig, FeePolicy};
use ehr_04_capability::Role;
use serde::{Deserialize, Serialize};
use shared_types::{parse_address, Address, NetworkContext};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },

    #[error("Invalid verifying contract address: {0}")]
    InvalidAddress(String),

    /// A zero verifying authority would let signatures bind to nothing.
    #[error("Verifying contract must not be the zero address")]
    ZeroVerifyingContract,

    #[error("Chain id must not be zero")]
    ZeroChainId,

    #[error("Default ttl must not be zero")]
    ZeroTtl,

    #[error("Unknown default role {0}")]
    UnknownRole(u8),
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EhrConfig {
    pub network: NetworkSection,
    pub capability: CapabilitySection,
    pub consent: ConsentSection,
    pub broker: BrokerSection,
}

/// Signing-domain binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSection {
    pub chain_id: u64,
    pub verifying_contract: String,
    pub domain_name: String,
    pub domain_version: String,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            chain_id: 1337,
            verifying_contract: "0x5fbdb2315678afecb367f032d93f642f64180aa3".to_string(),
            domain_name: "AccessRegistry".to_string(),
            domain_version: "1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitySection {
    /// Request validity window in milliseconds.
    pub default_ttl_ms: u64,
    pub default_role: u8,
}

impl Default for CapabilitySection {
    fn default() -> Self {
        Self {
            default_ttl_ms: 600_000,
            default_role: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentSection {
    /// Consent flag of a freshly anchored record.
    pub default_active: bool,
}

impl Default for ConsentSection {
    fn default() -> Self {
        Self {
            default_active: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSection {
    pub fee_policy: FeePolicy,
    pub default_gas: Option<u64>,
}

impl EhrConfig {
    /// File (if any), then environment, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `EHR_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("EHR_CHAIN_ID") {
            self.network.chain_id = parse_number("EHR_CHAIN_ID", &value)?;
        }
        if let Some(value) = lookup("EHR_VERIFYING_CONTRACT") {
            self.network.verifying_contract = value;
        }
        if let Some(value) = lookup("EHR_DEFAULT_TTL_MS") {
            self.capability.default_ttl_ms = parse_number("EHR_DEFAULT_TTL_MS", &value)?;
        }
        if let Some(value) = lookup("EHR_FEE_POLICY") {
            self.broker.fee_policy = match value.trim() {
                "prefer_priority_fee" => FeePolicy::PreferPriorityFee,
                "prefer_legacy" => FeePolicy::PreferLegacy,
                "defer_to_wallet" => FeePolicy::DeferToWallet,
                other => {
                    return Err(ConfigError::InvalidEnv {
                        var: "EHR_FEE_POLICY",
                        reason: format!("unknown policy {other}"),
                    })
                }
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.chain_id == 0 {
            return Err(ConfigError::ZeroChainId);
        }
        if self.verifying_authority()? == [0u8; 20] {
            return Err(ConfigError::ZeroVerifyingContract);
        }
        if self.capability.default_ttl_ms == 0 {
            return Err(ConfigError::ZeroTtl);
        }
        self.default_role()?;
        Ok(())
    }

    pub fn verifying_authority(&self) -> Result<Address, ConfigError> {
        parse_address(&self.network.verifying_contract)
            .map_err(|e| ConfigError::InvalidAddress(e.to_string()))
    }

    pub fn default_role(&self) -> Result<Role, ConfigError> {
        Role::from_u8(self.capability.default_role)
            .ok_or(ConfigError::UnknownRole(self.capability.default_role))
    }

    /// Network binding handed to sessions.
    pub fn network_context(&self) -> Result<NetworkContext, ConfigError> {
        Ok(NetworkContext {
            chain_id: self.network.chain_id,
            verifying_authority: self.verifying_authority()?,
            protocol_name: self.network.domain_name.clone(),
            protocol_version: self.network.domain_version.clone(),
        })
    }

    pub fn broker_config(&self) -> BrokerConfig {
        BrokerConfig {
            fee_policy: self.broker.fee_policy,
            default_gas: self.broker.default_gas,
        }
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnv {
        var,
        reason: e.to_string(),
    })
}
