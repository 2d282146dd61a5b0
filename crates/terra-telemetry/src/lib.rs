//! # Terra Telemetry
//!
//! Structured logging and Prometheus metrics for TerraClaim.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use terra_telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::from_env())?;
//! terra_telemetry::RATE_LIMITED.inc();
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TC_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `TC_JSON_LOGS` | `true` in containers | JSON log lines |
//! | `TC_ENV` | `development` | Deployment environment |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, RequestTimer, BATCH_ENTRIES_REJECTED, CLAIMS_TOTAL,
    GEOCODER_REQUESTS, GEO_CACHE_HITS, PIXELS_PAINTED, RATE_LIMITED, REGISTRY, REQUEST_DURATION,
    STORE_ERRORS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics and install the global subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}
