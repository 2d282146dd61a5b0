//! Rate limiter configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_types::{duration_serde, ConfigError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimiterConfig {
    /// Enable rate limiting
    pub enabled: bool,
    /// Requests admitted per client per window
    pub max_per_window: u32,
    /// Window length
    #[serde(with = "duration_serde")]
    pub window: Duration,
    /// Client keys never limited
    pub whitelist: Vec<String>,
    /// Minimum gap between stale-window sweeps
    #[serde(with = "duration_serde")]
    pub sweep_interval: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_per_window: 30,
            window: Duration::from_secs(60),
            whitelist: vec!["127.0.0.1".to_string(), "::1".to_string()],
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl RateLimiterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_per_window == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_per_window cannot be 0".into(),
            ));
        }
        if self.window.as_millis() == 0 {
            return Err(ConfigError::InvalidDuration("window cannot be 0".into()));
        }
        Ok(())
    }

    pub fn window_ms(&self) -> u64 {
        self.window.as_millis() as u64
    }
}
