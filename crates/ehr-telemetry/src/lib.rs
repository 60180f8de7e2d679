//! # EHR Telemetry
//!
//! Structured logging for the EHR vault protocol components.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ehr_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Events from every component are now collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EHR_SERVICE_NAME` | `ehr-vault` | Service name on every event |
//! | `EHR_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `EHR_CONSOLE_OUTPUT` | `true` | Write events to stdout |
//! | `EHR_JSON_LOGS` | `false` | JSON instead of human-readable |

#![warn(missing_docs)]

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("Telemetry already initialized: {0}")]
    AlreadyInitialized(String),

    /// The filter directive or another setting is malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize structured logging.
///
/// Returns a guard that should be held for the lifetime of the application.
/// Calling this twice returns [`TelemetryError::AlreadyInitialized`].
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    tracing_setup::init_tracing(&config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        level = %config.log_level,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    /// Service name the subscriber was installed for.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_init_is_error() {
        let config = TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::default()
        };
        // Another test in this binary may already have installed a subscriber;
        // either way the second call must fail without panicking.
        let _first = init_telemetry(config.clone());
        let second = init_telemetry(config);
        assert!(matches!(second, Err(TelemetryError::AlreadyInitialized(_))));
    }
}
