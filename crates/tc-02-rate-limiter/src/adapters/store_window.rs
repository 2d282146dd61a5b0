//! Fixed-window limiter backed by the shared store.
//!
//! Windows are aligned to multiples of the window length so every instance
//! agrees on the bucket. One grouped `INCR` + `EXPIRE` per request.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use shared_store::{keys, Pipeline, SharedStore};
use shared_types::{TimeSource, Timestamp};
use tracing::{error, warn};

use crate::domain::{Admission, RateLimiterConfig};
use crate::ports::AdmissionControl;

pub struct StoreWindowLimiter {
    store: Arc<dyn SharedStore>,
    whitelist: HashSet<String>,
    config: RateLimiterConfig,
    clock: Arc<dyn TimeSource>,
}

impl StoreWindowLimiter {
    pub fn new(
        config: RateLimiterConfig,
        store: Arc<dyn SharedStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let whitelist = config.whitelist.iter().cloned().collect();
        Self {
            store,
            whitelist,
            config,
            clock,
        }
    }

    pub async fn admit_at(&self, client_key: &str, now: Timestamp) -> Admission {
        if !self.config.enabled || self.whitelist.contains(client_key) {
            return Admission::allow();
        }

        let window_ms = self.config.window_ms();
        let bucket = now / window_ms;
        let key = keys::rate_window(client_key, bucket);

        let mut pipeline = Pipeline::new();
        let count_idx = pipeline.incr_by(key.as_str(), 1);
        pipeline.expire(key.as_str(), self.config.window);

        let count = match self.store.execute(pipeline).await {
            Ok(replies) => replies
                .get(count_idx)
                .and_then(|r| r.as_int())
                .unwrap_or_default(),
            Err(e) => {
                // Fail open: a store outage must not lock every client out.
                error!(client_key, error = %e, "rate window store unavailable, admitting");
                return Admission::allow();
            }
        };

        if count <= i64::from(self.config.max_per_window) {
            Admission::allow()
        } else {
            let retry_after_ms = (bucket + 1) * window_ms - now;
            warn!(client_key, retry_after_ms, "rate limit exceeded");
            Admission::deny(retry_after_ms)
        }
    }
}

#[async_trait]
impl AdmissionControl for StoreWindowLimiter {
    async fn admit(&self, client_key: &str) -> Admission {
        self.admit_at(client_key, self.clock.now_millis()).await
    }
}
