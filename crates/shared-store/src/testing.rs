//! Test doubles for the store port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::TimeSource;

use crate::command::{CommandReply, Pipeline};
use crate::errors::StoreError;
use crate::memory::InMemoryStore;
use crate::ports::SharedStore;

/// In-memory store with switchable network failures and latency.
///
/// Counts every call that reaches it, including ones it fails.
#[derive(Default)]
pub struct FailingStore {
    inner: InMemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    latency: Mutex<Option<Duration>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            inner: InMemoryStore::with_clock(clock),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Direct access that bypasses failure injection and counters.
    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    async fn before_read(&self) -> Result<(), StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".into()));
        }
        Ok(())
    }

    async fn before_write(&self) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }

    async fn delay(&self) {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl SharedStore for FailingStore {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        self.before_read().await?;
        self.inner.hget(key, field).await
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.before_read().await?;
        self.inner.hgetall(key).await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.before_write().await?;
        self.inner.hset(key, field, value).await
    }

    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError> {
        self.before_write().await?;
        self.inner.hincr_by(key, field, delta).await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.before_write().await?;
        self.inner.sadd(key, member).await
    }

    async fn scard(&self, key: &str) -> Result<u64, StoreError> {
        self.before_read().await?;
        self.inner.scard(key).await
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.before_read().await?;
        self.inner.sismember(key, member).await
    }

    async fn smismember(&self, key: &str, members: &[String]) -> Result<Vec<bool>, StoreError> {
        self.before_read().await?;
        self.inner.smismember(key, members).await
    }

    async fn smembers(&self, key: &str, limit: Option<usize>) -> Result<Vec<String>, StoreError> {
        self.before_read().await?;
        self.inner.smembers(key, limit).await
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<bool, StoreError> {
        self.before_write().await?;
        self.inner.zadd(key, score, member).await
    }

    async fn zrevrange_by_score(
        &self,
        key: &str,
        max: i64,
        min: i64,
        limit: Option<usize>,
    ) -> Result<Vec<(String, i64)>, StoreError> {
        self.before_read().await?;
        self.inner.zrevrange_by_score(key, max, min, limit).await
    }

    async fn zrem_range_by_score(&self, key: &str, min: i64, max: i64) -> Result<u64, StoreError> {
        self.before_write().await?;
        self.inner.zrem_range_by_score(key, min, max).await
    }

    async fn zcard(&self, key: &str) -> Result<u64, StoreError> {
        self.before_read().await?;
        self.inner.zcard(key).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.before_read().await?;
        self.inner.get(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.before_write().await?;
        self.inner.set_ex(key, value, ttl).await
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        self.before_write().await?;
        self.inner.incr_by(key, delta).await
    }

    async fn execute(&self, pipeline: Pipeline) -> Result<Vec<CommandReply>, StoreError> {
        self.before_write().await?;
        self.inner.execute(pipeline).await
    }
}
