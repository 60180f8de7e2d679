//! # EHR Vault
//!
//! Runs the create → share → redact walkthrough against an in-process
//! deployment and reports what each participant saw.
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments and initialize telemetry
//! 2. Load configuration (file, then `EHR_*` overrides)
//! 3. Build the deployment
//! 4. Run the walkthrough

use anyhow::{Context, Result};
use clap::Parser;
use ehr_runtime::container::{Deployment, EhrConfig};
use ehr_runtime::walkthrough;
use ehr_telemetry::{init_telemetry, TelemetryConfig};
use shared_types::SystemTimeSource;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "ehr-runtime", version, about = "EHR vault protocol walkthrough")]
struct Args {
    /// TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::from_env();
    telemetry.json_logs |= args.json_logs;
    let _guard = init_telemetry(telemetry).context("Failed to initialize telemetry")?;

    let config = EhrConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let deployment = Deployment::new(config, Arc::new(SystemTimeSource))
        .context("Invalid deployment configuration")?;

    let report = walkthrough::run(
        &deployment,
        b"2026-03-02 lipid panel: LDL 3.1 mmol/L",
        b"2026-03-02 lipid panel: LDL 3.1 mmol/L (fasting)",
    )
    .await?;

    info!(
        record_id = %report.record_id,
        commitment = %report.commitment_hash.to_hex(),
        request_status = %report.request_status,
        viewed_bytes = report.viewed_bytes,
        "Walkthrough complete"
    );
    println!("record      {}", report.record_id);
    println!("commitment  {}", report.commitment_hash.to_hex());
    println!("request     {}", report.request_status);
    println!("before      {}", String::from_utf8_lossy(&report.original));
    println!("after       {}", String::from_utf8_lossy(&report.redacted));
    Ok(())
}
