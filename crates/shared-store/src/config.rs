//! Store access limits.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_types::{duration_serde, ConfigError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound on any single store call.
    #[serde(with = "duration_serde")]
    pub operation_timeout: Duration,
    /// Extra attempts for idempotent reads. Writes are never retried.
    pub read_retries: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(2),
            read_retries: 2,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.operation_timeout.is_zero() {
            return Err(ConfigError::InvalidDuration(
                "operation_timeout cannot be 0".into(),
            ));
        }
        if self.read_retries > 10 {
            return Err(ConfigError::InvalidLimit(
                "read_retries above 10 defeats the timeout budget".into(),
            ));
        }
        Ok(())
    }
}
