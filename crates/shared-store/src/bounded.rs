//! # Bounded Store
//!
//! Decorator that puts a deadline on every call to the wrapped store.
//!
//! - Reads are idempotent: a timeout or connection failure is retried up to
//!   `read_retries` more times.
//! - Writes are attempted once. A write that times out may still land, so it
//!   surfaces as `StoreError::Ambiguous` and the caller decides what a retry
//!   would mean.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::command::{CommandReply, Pipeline};
use crate::config::StoreConfig;
use crate::errors::StoreError;
use crate::ports::SharedStore;

pub struct BoundedStore<S: ?Sized> {
    inner: Arc<S>,
    config: StoreConfig,
}

impl<S: SharedStore + ?Sized> BoundedStore<S> {
    pub fn new(inner: Arc<S>, config: StoreConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn timeout_ms(&self) -> u64 {
        self.config.operation_timeout.as_millis() as u64
    }

    async fn read<'a, T, F, Fut>(&'a self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, StoreError>> + 'a,
    {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.config.operation_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout {
                    operation,
                    timeout_ms: self.timeout_ms(),
                }),
            };
            match result {
                Err(err) if err.is_transient() && attempt < self.config.read_retries => {
                    attempt += 1;
                    debug!(operation, attempt, error = %err, "retrying store read");
                }
                other => return other,
            }
        }
    }

    async fn write<'a, T, Fut>(&'a self, operation: &'static str, call: Fut) -> Result<T, StoreError>
    where
        Fut: Future<Output = Result<T, StoreError>> + 'a,
    {
        match tokio::time::timeout(self.config.operation_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_ms = self.timeout_ms(), "store write timed out, outcome unknown");
                Err(StoreError::Ambiguous {
                    operation,
                    timeout_ms: self.timeout_ms(),
                })
            }
        }
    }
}

#[async_trait]
impl<S: SharedStore + ?Sized> SharedStore for BoundedStore<S> {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        self.read("hget", || self.inner.hget(key, field)).await
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.read("hgetall", || self.inner.hgetall(key)).await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.write("hset", self.inner.hset(key, field, value)).await
    }

    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError> {
        self.write("hincrby", self.inner.hincr_by(key, field, delta)).await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.write("sadd", self.inner.sadd(key, member)).await
    }

    async fn scard(&self, key: &str) -> Result<u64, StoreError> {
        self.read("scard", || self.inner.scard(key)).await
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.read("sismember", || self.inner.sismember(key, member)).await
    }

    async fn smismember(&self, key: &str, members: &[String]) -> Result<Vec<bool>, StoreError> {
        self.read("smismember", || self.inner.smismember(key, members)).await
    }

    async fn smembers(&self, key: &str, limit: Option<usize>) -> Result<Vec<String>, StoreError> {
        self.read("smembers", || self.inner.smembers(key, limit)).await
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<bool, StoreError> {
        self.write("zadd", self.inner.zadd(key, score, member)).await
    }

    async fn zrevrange_by_score(
        &self,
        key: &str,
        max: i64,
        min: i64,
        limit: Option<usize>,
    ) -> Result<Vec<(String, i64)>, StoreError> {
        self.read("zrevrangebyscore", || {
            self.inner.zrevrange_by_score(key, max, min, limit)
        })
        .await
    }

    async fn zrem_range_by_score(&self, key: &str, min: i64, max: i64) -> Result<u64, StoreError> {
        self.write("zremrangebyscore", self.inner.zrem_range_by_score(key, min, max))
            .await
    }

    async fn zcard(&self, key: &str) -> Result<u64, StoreError> {
        self.read("zcard", || self.inner.zcard(key)).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.read("get", || self.inner.get(key)).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.write("setex", self.inner.set_ex(key, value, ttl)).await
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        self.write("incrby", self.inner.incr_by(key, delta)).await
    }

    async fn execute(&self, pipeline: Pipeline) -> Result<Vec<CommandReply>, StoreError> {
        self.write("execute", self.inner.execute(pipeline)).await
    }
}
