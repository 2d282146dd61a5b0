//! # TerraClaim Node
//!
//! Binary entry point. See the `node_runtime` library docs for the startup
//! sequence and `NodeConfig::from_lookup` for the environment variables.

use anyhow::{Context, Result};
use tracing::error;

use node_runtime::container::NodeConfig;
use terra_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("failed to initialize telemetry")?;

    let config = NodeConfig::from_env().context("failed to load configuration")?;

    if let Err(e) = node_runtime::run(config).await {
        error!(error = %e, "node exited with error");
        return Err(e);
    }
    Ok(())
}
