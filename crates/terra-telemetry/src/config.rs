//! Telemetry configuration from environment variables.

use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error, or a full directive)
    pub log_level: String,

    /// Emit one JSON object per line instead of human-readable output
    pub json_logs: bool,

    /// Deployment environment (production, development)
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "terraclaim".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            environment: "development".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TC_SERVICE_NAME`: Service name (default: terraclaim)
    /// - `TC_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `TC_JSON_LOGS`: JSON output (default: true in containers, false otherwise)
    /// - `TC_ENV`: Deployment environment (default: development)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("TC_SERVICE_NAME")
                .unwrap_or_else(|_| "terraclaim".to_string()),

            log_level: env::var("TC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("TC_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            environment: env::var("TC_ENV").unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}
