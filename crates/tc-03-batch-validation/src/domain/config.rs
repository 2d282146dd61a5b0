//! Validation limits.

use serde::{Deserialize, Serialize};
use shared_types::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum entries in a claim or paint batch
    pub max_batch_size: usize,
    /// Maximum actor id length in bytes
    pub max_actor_id_len: usize,
    /// Maximum pixel position length in bytes
    pub max_position_len: usize,
    /// Maximum color string length in bytes
    pub max_color_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 50,
            max_actor_id_len: 128,
            max_position_len: 64,
            max_color_len: 32,
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("max_batch_size", self.max_batch_size),
            ("max_actor_id_len", self.max_actor_id_len),
            ("max_position_len", self.max_position_len),
            ("max_color_len", self.max_color_len),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidLimit(format!("{name} cannot be 0")));
            }
        }
        Ok(())
    }
}
