//! Aggregation view sizes and cache policy.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_types::{duration_serde, ConfigError};

/// Claimable land cells worldwide at the default cell size.
pub const WORLD_TOTAL_CELLS: u64 = 1_489_400;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Lifetime of cached aggregates. Zero disables caching.
    #[serde(with = "duration_serde")]
    pub cache_ttl: Duration,
    pub leaderboard_size: usize,
    pub country_stats_size: usize,
    pub recent_activity_limit: usize,
    /// Most cells returned by the world-state read.
    pub claimed_cells_cap: usize,
    /// Denominator for the world percentage.
    pub world_total_cells: u64,
    /// Per-country total-cell overrides, keyed by country code.
    pub country_totals: HashMap<String, u64>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(5),
            leaderboard_size: 10,
            country_stats_size: 20,
            recent_activity_limit: 20,
            claimed_cells_cap: 1000,
            world_total_cells: WORLD_TOTAL_CELLS,
            country_totals: HashMap::new(),
        }
    }
}

impl AggregationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("leaderboard_size", self.leaderboard_size),
            ("country_stats_size", self.country_stats_size),
            ("recent_activity_limit", self.recent_activity_limit),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidLimit(format!("{name} cannot be 0")));
            }
        }
        if self.world_total_cells == 0 {
            return Err(ConfigError::InvalidLimit(
                "world_total_cells cannot be 0".into(),
            ));
        }
        if let Some((code, _)) = self.country_totals.iter().find(|(_, total)| **total == 0) {
            return Err(ConfigError::InvalidLimit(format!(
                "country total for {code} cannot be 0"
            )));
        }
        Ok(())
    }

    pub fn cache_ttl_ms(&self) -> u64 {
        self.cache_ttl.as_millis() as u64
    }
}
