//! Timeline retention settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_types::{duration_serde, ConfigError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Entries older than this are removed by the next pruning pass.
    #[serde(with = "duration_serde")]
    pub retention: Duration,
    /// Look-back used for the online-actor count.
    #[serde(with = "duration_serde")]
    pub online_window: Duration,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(24 * 60 * 60),
            online_window: Duration::from_secs(5 * 60),
        }
    }
}

impl TimelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retention.is_zero() {
            return Err(ConfigError::InvalidDuration("retention cannot be 0".into()));
        }
        if self.online_window.is_zero() {
            return Err(ConfigError::InvalidDuration(
                "online_window cannot be 0".into(),
            ));
        }
        if self.online_window > self.retention {
            return Err(ConfigError::InvalidDuration(
                "online_window cannot exceed retention".into(),
            ));
        }
        Ok(())
    }

    pub fn retention_ms(&self) -> u64 {
        self.retention.as_millis() as u64
    }

    pub fn online_window_ms(&self) -> u64 {
        self.online_window.as_millis() as u64
    }
}
