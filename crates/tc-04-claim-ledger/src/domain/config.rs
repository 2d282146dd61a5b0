//! Ledger policy.

use serde::{Deserialize, Serialize};
use shared_types::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Claim cells whose classification is unavailable, attributing them to
    /// the unclassified country. Off: such cells are unclaimable.
    pub accept_unknown_territory: bool,
    /// Classifications in flight at once for one batch.
    pub batch_classify_concurrency: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            accept_unknown_territory: false,
            batch_classify_concurrency: 8,
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_classify_concurrency == 0 {
            return Err(ConfigError::InvalidLimit(
                "batch_classify_concurrency cannot be 0".into(),
            ));
        }
        Ok(())
    }
}
