//! Short-lived result cache keyed by view parameters.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use shared_types::{TimeSource, Timestamp};

pub struct TtlCache<K, V> {
    entries: DashMap<K, (Timestamp, V)>,
    ttl_ms: u64,
    clock: Arc<dyn TimeSource>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl_ms: u64, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_ms,
            clock,
        }
    }

    /// Fresh value for `key`, dropping it if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        if self.ttl_ms == 0 {
            return None;
        }
        let now = self.clock.now_millis();
        let fresh = {
            let entry = self.entries.get(key)?;
            let (stored_at, value) = entry.value();
            self.is_live(*stored_at, now).then(|| value.clone())
        };
        if fresh.is_none() {
            self.evict_stale(key, now);
        }
        fresh
    }

    fn is_live(&self, stored_at: Timestamp, now: Timestamp) -> bool {
        now.saturating_sub(stored_at) < self.ttl_ms
    }

    /// Removes `key` only if the entry present at removal time is stale, so a
    /// value inserted after the read survives.
    fn evict_stale(&self, key: &K, now: Timestamp) {
        self.entries
            .remove_if(key, |_, (stored_at, _)| !self.is_live(*stored_at, now));
    }

    pub fn insert(&self, key: K, value: V) {
        if self.ttl_ms == 0 {
            return;
        }
        self.entries.insert(key, (self.clock.now_millis(), value));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
