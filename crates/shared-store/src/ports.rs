//! # Store Port
//!
//! The operations the engine needs from the shared key-value store.
//!
//! Production deployments point this at a networked store; tests and
//! single-node runs use `InMemoryStore`. Every call may suspend, so callers
//! should reach the store through `BoundedStore` to keep each call bounded.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::command::{CommandReply, Pipeline};
use crate::errors::StoreError;

#[async_trait]
pub trait SharedStore: Send + Sync {
    // --- hashes ---

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;

    /// Returns the new value of the field.
    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError>;

    // --- sets ---

    /// Returns true when the member was not present before.
    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    async fn scard(&self, key: &str) -> Result<u64, StoreError>;

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Membership of each member, in input order.
    async fn smismember(&self, key: &str, members: &[String]) -> Result<Vec<bool>, StoreError>;

    /// Members in ascending order, truncated to `limit` when given.
    async fn smembers(&self, key: &str, limit: Option<usize>) -> Result<Vec<String>, StoreError>;

    // --- sorted sets ---

    /// Returns true when the member was not present before.
    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<bool, StoreError>;

    /// Members with `min <= score <= max`, highest score first.
    async fn zrevrange_by_score(
        &self,
        key: &str,
        max: i64,
        min: i64,
        limit: Option<usize>,
    ) -> Result<Vec<(String, i64)>, StoreError>;

    /// Removes members with `min <= score <= max`; returns how many.
    async fn zrem_range_by_score(&self, key: &str, min: i64, max: i64) -> Result<u64, StoreError>;

    async fn zcard(&self, key: &str) -> Result<u64, StoreError>;

    // --- strings ---

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Returns the new value; a missing key counts from zero.
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError>;

    // --- grouped write ---

    /// Submit every command in one round trip. Replies are in command order.
    async fn execute(&self, pipeline: Pipeline) -> Result<Vec<CommandReply>, StoreError>;
}
