//! Classifier configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_types::{duration_serde, ConfigError};

/// Largest grid precision accepted for cache keys.
pub const MAX_GRID_PRECISION: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoClassifierConfig {
    /// Equivalent reverse-geocoder base URLs, tried round-robin.
    pub mirrors: Vec<String>,
    /// Budget for one mirror attempt.
    #[serde(with = "duration_serde")]
    pub attempt_timeout: Duration,
    /// Attempts per classification; 0 means one per mirror.
    pub max_attempts: usize,
    /// Lifetime of a cached classification.
    #[serde(with = "duration_serde")]
    pub cache_ttl: Duration,
    /// Decimal places of the cache grid (2 ≈ 1.1 km).
    pub grid_precision: u32,
    /// Sent with every lookup; public mirrors require an identifying agent.
    pub user_agent: String,
}

impl Default for GeoClassifierConfig {
    fn default() -> Self {
        Self {
            mirrors: vec!["https://nominatim.openstreetmap.org".to_string()],
            attempt_timeout: Duration::from_secs(3),
            max_attempts: 0,
            cache_ttl: Duration::from_secs(30 * 24 * 60 * 60),
            grid_precision: 2,
            user_agent: concat!("terraclaim/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl GeoClassifierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mirrors.is_empty() {
            return Err(ConfigError::InvalidEndpoint(
                "at least one geocoder mirror is required".into(),
            ));
        }
        if let Some(bad) = self
            .mirrors
            .iter()
            .find(|m| !(m.starts_with("http://") || m.starts_with("https://")))
        {
            return Err(ConfigError::InvalidEndpoint(format!(
                "mirror must be an http(s) URL: {bad}"
            )));
        }
        if self.attempt_timeout.is_zero() {
            return Err(ConfigError::InvalidDuration(
                "attempt_timeout cannot be 0".into(),
            ));
        }
        if self.cache_ttl.is_zero() {
            return Err(ConfigError::InvalidDuration("cache_ttl cannot be 0".into()));
        }
        if self.grid_precision > MAX_GRID_PRECISION {
            return Err(ConfigError::InvalidLimit(format!(
                "grid_precision above {MAX_GRID_PRECISION}"
            )));
        }
        Ok(())
    }

    /// Effective attempts per classification.
    pub fn attempts(&self) -> usize {
        if self.max_attempts == 0 {
            self.mirrors.len()
        } else {
            self.max_attempts
        }
    }
}
