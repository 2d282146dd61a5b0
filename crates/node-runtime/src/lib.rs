//! # TerraClaim Node Runtime
//!
//! Loads configuration, wires every subsystem and serves the HTTP gateway.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (`TC_LOG_LEVEL`, `TC_JSON_LOGS`)
//! 2. Load `NodeConfig` from `TC_*` variables and validate it
//! 3. Build the `SubsystemContainer`
//! 4. Serve until ctrl-c

pub mod container;

use anyhow::{Context, Result};
use tracing::info;

use crate::container::{NodeConfig, SubsystemContainer};

/// Run the node with an already-loaded configuration.
pub async fn run(config: NodeConfig) -> Result<()> {
    config.validate().context("invalid configuration")?;
    config
        .validate_for_production()
        .context("configuration not allowed in production")?;

    let container =
        SubsystemContainer::new(config).context("failed to build geocoder clients")?;
    info!(
        environment = ?container.config.environment,
        mirrors = container.config.geo.mirrors.len(),
        "starting TerraClaim node"
    );

    tc_07_api_gateway::serve(&container.config.gateway, container.claim_service.clone())
        .await
        .context("gateway stopped")?;

    info!("node stopped");
    Ok(())
}
