//! Process-local fixed-window limiter.
//!
//! One `RateWindow` per client key in a sharded map. Lapsed windows are swept
//! opportunistically from the request path, at most once per
//! `sweep_interval`, so memory stays bounded without a background task.
//!
//! Limits are per process: N instances admit up to N times the configured
//! rate. Use `StoreWindowLimiter` when that matters.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::{TimeSource, Timestamp};
use tracing::{debug, warn};

use crate::domain::{Admission, RateLimiterConfig, RateWindow};
use crate::ports::AdmissionControl;

pub struct FixedWindowLimiter {
    windows: DashMap<String, RateWindow>,
    whitelist: HashSet<String>,
    config: RateLimiterConfig,
    clock: Arc<dyn TimeSource>,
    last_sweep: AtomicU64,
}

impl FixedWindowLimiter {
    pub fn new(config: RateLimiterConfig, clock: Arc<dyn TimeSource>) -> Self {
        let whitelist = config.whitelist.iter().cloned().collect();
        let last_sweep = AtomicU64::new(clock.now_millis());
        Self {
            windows: DashMap::new(),
            whitelist,
            config,
            clock,
            last_sweep,
        }
    }

    /// Admission decision for `client_key` at an explicit time.
    pub fn admit_at(&self, client_key: &str, now: Timestamp) -> Admission {
        if !self.config.enabled || self.whitelist.contains(client_key) {
            return Admission::allow();
        }

        self.maybe_sweep(now);

        let window_ms = self.config.window_ms();
        let admission = match self.windows.entry(client_key.to_string()) {
            Entry::Occupied(mut entry) => {
                entry
                    .get_mut()
                    .record(now, window_ms, self.config.max_per_window)
            }
            Entry::Vacant(entry) => {
                debug!(client_key, "opening rate window");
                entry.insert(RateWindow::open(now));
                Admission::allow()
            }
        };

        if let Some(retry_after_ms) = admission.retry_after_ms {
            warn!(client_key, retry_after_ms, "rate limit exceeded");
        }
        admission
    }

    fn maybe_sweep(&self, now: Timestamp) {
        let interval = self.config.sweep_interval.as_millis() as u64;
        let last = self.last_sweep.load(Ordering::Relaxed);
        if now.saturating_sub(last) < interval {
            return;
        }
        if self
            .last_sweep
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        self.sweep(now);
    }

    /// Drop every window that has lapsed.
    pub fn sweep(&self, now: Timestamp) {
        let window_ms = self.config.window_ms();
        let before = self.windows.len();
        self.windows.retain(|_, window| !window.is_lapsed(now, window_ms));
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed, "swept lapsed rate windows");
        }
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Current window for a client, if any.
    pub fn window(&self, client_key: &str) -> Option<RateWindow> {
        self.windows.get(client_key).map(|w| *w)
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

#[async_trait]
impl AdmissionControl for FixedWindowLimiter {
    async fn admit(&self, client_key: &str) -> Admission {
        self.admit_at(client_key, self.clock.now_millis())
    }
}
