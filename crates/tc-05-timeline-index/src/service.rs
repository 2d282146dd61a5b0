//! # Timeline Index
//!
//! Append-only log of accepted claims or paints, stored as a sorted set of
//! JSON entries scored by timestamp.
//!
//! Pruning is opportunistic: the ledger calls `prune_expired` after each
//! successful write. With no writes, stale entries stay until the next one.

use std::collections::HashSet;
use std::sync::Arc;

use shared_store::{keys, Pipeline, SharedStore};
use shared_types::{ActorId, TimelineEntry, Timestamp};
use tracing::{debug, warn};

use crate::domain::{TimelineConfig, TimelineError};

pub struct TimelineIndex {
    store: Arc<dyn SharedStore>,
    key: &'static str,
    config: TimelineConfig,
}

impl TimelineIndex {
    pub fn new(store: Arc<dyn SharedStore>, key: &'static str, config: TimelineConfig) -> Self {
        Self { store, key, config }
    }

    /// Log of cell claims.
    pub fn cells(store: Arc<dyn SharedStore>, config: TimelineConfig) -> Self {
        Self::new(store, keys::CELL_TIMELINE, config)
    }

    /// Log of pixel paints.
    pub fn pixels(store: Arc<dyn SharedStore>, config: TimelineConfig) -> Self {
        Self::new(store, keys::PIXEL_TIMELINE, config)
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub async fn append(&self, entry: &TimelineEntry) -> Result<(), TimelineError> {
        let member = encode(entry)?;
        self.store
            .zadd(self.key, score(entry.timestamp), &member)
            .await?;
        Ok(())
    }

    /// Queue an append inside a caller's grouped write.
    pub fn append_command(
        &self,
        pipeline: &mut Pipeline,
        entry: &TimelineEntry,
    ) -> Result<usize, TimelineError> {
        let member = encode(entry)?;
        Ok(pipeline.zadd(self.key, score(entry.timestamp), member))
    }

    /// Entries with `from <= timestamp <= to`, newest first.
    pub async fn range_since(
        &self,
        from: Timestamp,
        to: Timestamp,
        limit: Option<usize>,
    ) -> Result<Vec<TimelineEntry>, TimelineError> {
        let raw = self
            .store
            .zrevrange_by_score(self.key, score(to), score(from), limit)
            .await?;
        Ok(raw
            .into_iter()
            .filter_map(|(member, _)| match serde_json::from_str(&member) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(key = self.key, error = %e, "skipping unreadable timeline entry");
                    None
                }
            })
            .collect())
    }

    /// Most recent entries up to `now`. Not filtered by retention: entries
    /// linger until a prune runs.
    pub async fn recent(
        &self,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<TimelineEntry>, TimelineError> {
        self.range_since(0, now, Some(limit)).await
    }

    /// Remove entries with timestamp strictly below `cutoff`.
    pub async fn prune_older_than(&self, cutoff: Timestamp) -> Result<u64, TimelineError> {
        if cutoff == 0 {
            return Ok(0);
        }
        let removed = self
            .store
            .zrem_range_by_score(self.key, i64::MIN, score(cutoff) - 1)
            .await?;
        if removed > 0 {
            debug!(key = self.key, removed, cutoff, "pruned timeline");
        }
        Ok(removed)
    }

    /// Apply the retention window relative to `now`.
    pub async fn prune_expired(&self, now: Timestamp) -> Result<u64, TimelineError> {
        self.prune_older_than(now.saturating_sub(self.config.retention_ms()))
            .await
    }

    /// Distinct actors with an entry inside the online window.
    pub async fn active_actors(&self, now: Timestamp) -> Result<HashSet<ActorId>, TimelineError> {
        let from = now.saturating_sub(self.config.online_window_ms());
        Ok(self
            .range_since(from, now, None)
            .await?
            .into_iter()
            .map(|entry| entry.actor_id)
            .collect())
    }

    /// Count of active actors, never below 1.
    pub async fn online_actors(&self, now: Timestamp) -> Result<u64, TimelineError> {
        Ok((self.active_actors(now).await?.len() as u64).max(1))
    }

    pub async fn len(&self) -> Result<u64, TimelineError> {
        Ok(self.store.zcard(self.key).await?)
    }
}

fn encode(entry: &TimelineEntry) -> Result<String, TimelineError> {
    serde_json::to_string(entry).map_err(|e| TimelineError::Encode(e.to_string()))
}

fn score(timestamp: Timestamp) -> i64 {
    i64::try_from(timestamp).unwrap_or(i64::MAX)
}
