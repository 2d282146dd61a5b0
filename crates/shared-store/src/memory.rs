//! In-memory store adapter.
//!
//! One `RwLock` guards all data, so a pipeline is applied without any other
//! call interleaving. Command types are checked for the whole pipeline before
//! the first mutation, so a type error leaves the store untouched.

use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{SystemTimeSource, TimeSource, Timestamp};

use crate::command::{CommandReply, Pipeline, StoreCommand};
use crate::errors::StoreError;
use crate::ports::SharedStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Hash,
    Set,
    SortedSet,
    String,
}

#[derive(Debug, Default)]
struct SortedSet {
    scores: HashMap<String, i64>,
    ordered: BTreeSet<(i64, String)>,
}

impl SortedSet {
    fn insert(&mut self, score: i64, member: &str) -> bool {
        match self.scores.insert(member.to_string(), score) {
            Some(old) => {
                self.ordered.remove(&(old, member.to_string()));
                self.ordered.insert((score, member.to_string()));
                false
            }
            None => {
                self.ordered.insert((score, member.to_string()));
                true
            }
        }
    }

    fn remove_range(&mut self, min: i64, max: i64) -> u64 {
        if min > max {
            return 0;
        }
        let doomed: Vec<(i64, String)> = self
            .ordered
            .range((Bound::Included((min, String::new())), Bound::Unbounded))
            .take_while(|(score, _)| *score <= max)
            .cloned()
            .collect();
        for entry in &doomed {
            self.ordered.remove(entry);
            self.scores.remove(&entry.1);
        }
        doomed.len() as u64
    }

    fn rev_range(&self, max: i64, min: i64, limit: Option<usize>) -> Vec<(String, i64)> {
        if min > max {
            return Vec::new();
        }
        self.ordered
            .range((Bound::Included((min, String::new())), Bound::Unbounded))
            .rev()
            .skip_while(|(score, _)| *score > max)
            .take_while(|(score, _)| *score >= min)
            .take(limit.unwrap_or(usize::MAX))
            .map(|(score, member)| (member.clone(), *score))
            .collect()
    }
}

#[derive(Debug)]
struct StringEntry {
    value: String,
    expires_at: Option<Timestamp>,
}

#[derive(Debug, Default)]
struct Data {
    hashes: HashMap<String, HashMap<String, String>>,
    sets: HashMap<String, BTreeSet<String>>,
    zsets: HashMap<String, SortedSet>,
    strings: HashMap<String, StringEntry>,
}

impl Data {
    fn kind_of(&self, key: &str, now: Timestamp) -> Option<Kind> {
        if self.hashes.contains_key(key) {
            Some(Kind::Hash)
        } else if self.sets.contains_key(key) {
            Some(Kind::Set)
        } else if self.zsets.contains_key(key) {
            Some(Kind::SortedSet)
        } else if self.live_string(key, now).is_some() {
            Some(Kind::String)
        } else {
            None
        }
    }

    fn expect_kind(&self, key: &str, kind: Kind, now: Timestamp) -> Result<(), StoreError> {
        match self.kind_of(key, now) {
            Some(found) if found != kind => Err(StoreError::WrongType {
                key: key.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn live_string(&self, key: &str, now: Timestamp) -> Option<&StringEntry> {
        self.strings
            .get(key)
            .filter(|entry| entry.expires_at.map_or(true, |at| at > now))
    }

    fn purge_expired(&mut self, key: &str, now: Timestamp) {
        let expired = self
            .strings
            .get(key)
            .and_then(|entry| entry.expires_at)
            .map_or(false, |at| at <= now);
        if expired {
            self.strings.remove(key);
        }
    }

    fn check(&self, command: &StoreCommand, now: Timestamp) -> Result<(), StoreError> {
        match command {
            StoreCommand::HSet { key, .. } => self.expect_kind(key, Kind::Hash, now),
            StoreCommand::HIncrBy { key, field, .. } => {
                self.expect_kind(key, Kind::Hash, now)?;
                match self.hashes.get(key).and_then(|h| h.get(field)) {
                    Some(raw) => parse_int(key, raw).map(|_| ()),
                    None => Ok(()),
                }
            }
            StoreCommand::SAdd { key, .. } => self.expect_kind(key, Kind::Set, now),
            StoreCommand::ZAdd { key, .. } | StoreCommand::ZRemRangeByScore { key, .. } => {
                self.expect_kind(key, Kind::SortedSet, now)
            }
            StoreCommand::IncrBy { key, .. } => {
                self.expect_kind(key, Kind::String, now)?;
                match self.live_string(key, now) {
                    Some(entry) => parse_int(key, &entry.value).map(|_| ()),
                    None => Ok(()),
                }
            }
            StoreCommand::SetEx { .. } | StoreCommand::Expire { .. } => Ok(()),
        }
    }

    fn apply(&mut self, command: StoreCommand, now: Timestamp) -> Result<CommandReply, StoreError> {
        match command {
            StoreCommand::HSet { key, field, value } => {
                self.hashes.entry(key).or_default().insert(field, value);
                Ok(CommandReply::Ok)
            }
            StoreCommand::HIncrBy { key, field, delta } => {
                let hash = self.hashes.entry(key.clone()).or_default();
                let current = match hash.get(&field) {
                    Some(raw) => parse_int(&key, raw)?,
                    None => 0,
                };
                let next = current + delta;
                hash.insert(field, next.to_string());
                Ok(CommandReply::Int(next))
            }
            StoreCommand::SAdd { key, member } => {
                Ok(CommandReply::Bool(self.sets.entry(key).or_default().insert(member)))
            }
            StoreCommand::ZAdd { key, score, member } => {
                Ok(CommandReply::Bool(self.zsets.entry(key).or_default().insert(score, &member)))
            }
            StoreCommand::ZRemRangeByScore { key, min, max } => {
                let removed = match self.zsets.get_mut(&key) {
                    Some(zset) => {
                        let removed = zset.remove_range(min, max);
                        if zset.scores.is_empty() {
                            self.zsets.remove(&key);
                        }
                        removed
                    }
                    None => 0,
                };
                Ok(CommandReply::Int(removed as i64))
            }
            StoreCommand::IncrBy { key, delta } => {
                self.purge_expired(&key, now);
                let entry = self.strings.entry(key.clone()).or_insert(StringEntry {
                    value: "0".to_string(),
                    expires_at: None,
                });
                let next = parse_int(&key, &entry.value)? + delta;
                entry.value = next.to_string();
                Ok(CommandReply::Int(next))
            }
            StoreCommand::SetEx { key, value, ttl } => {
                self.strings.insert(
                    key,
                    StringEntry {
                        value,
                        expires_at: Some(now + ttl.as_millis() as u64),
                    },
                );
                Ok(CommandReply::Ok)
            }
            StoreCommand::Expire { key, ttl } => {
                self.purge_expired(&key, now);
                // Expiry only applies to string keys here.
                match self.strings.get_mut(&key) {
                    Some(entry) => {
                        entry.expires_at = Some(now + ttl.as_millis() as u64);
                        Ok(CommandReply::Bool(true))
                    }
                    None => Ok(CommandReply::Bool(false)),
                }
            }
        }
    }
}

fn parse_int(key: &str, raw: &str) -> Result<i64, StoreError> {
    raw.parse().map_err(|_| StoreError::Corrupt {
        key: key.to_string(),
        reason: format!("not an integer: {raw}"),
    })
}

/// Store held entirely in process memory.
pub struct InMemoryStore {
    data: RwLock<Data>,
    clock: Arc<dyn TimeSource>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemTimeSource))
    }

    /// Use `clock` for string expiry.
    pub fn with_clock(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            data: RwLock::new(Data::default()),
            clock,
        }
    }

    fn now(&self) -> Timestamp {
        self.clock.now_millis()
    }

    fn apply_one(&self, command: StoreCommand) -> Result<CommandReply, StoreError> {
        let now = self.now();
        let mut data = self.data.write();
        data.check(&command, now)?;
        data.apply(command, now)
    }
}

#[async_trait]
impl SharedStore for InMemoryStore {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let data = self.data.read();
        data.expect_kind(key, Kind::Hash, self.now())?;
        Ok(data.hashes.get(key).and_then(|h| h.get(field)).cloned())
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let data = self.data.read();
        data.expect_kind(key, Kind::Hash, self.now())?;
        Ok(data.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.apply_one(StoreCommand::HSet {
            key: key.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        })
        .map(|_| ())
    }

    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError> {
        let reply = self.apply_one(StoreCommand::HIncrBy {
            key: key.to_string(),
            field: field.to_string(),
            delta,
        })?;
        Ok(reply.as_int().unwrap_or_default())
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let reply = self.apply_one(StoreCommand::SAdd {
            key: key.to_string(),
            member: member.to_string(),
        })?;
        Ok(reply.as_bool().unwrap_or_default())
    }

    async fn scard(&self, key: &str) -> Result<u64, StoreError> {
        let data = self.data.read();
        data.expect_kind(key, Kind::Set, self.now())?;
        Ok(data.sets.get(key).map_or(0, |s| s.len() as u64))
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let data = self.data.read();
        data.expect_kind(key, Kind::Set, self.now())?;
        Ok(data.sets.get(key).map_or(false, |s| s.contains(member)))
    }

    async fn smismember(&self, key: &str, members: &[String]) -> Result<Vec<bool>, StoreError> {
        let data = self.data.read();
        data.expect_kind(key, Kind::Set, self.now())?;
        let set = data.sets.get(key);
        Ok(members
            .iter()
            .map(|m| set.map_or(false, |s| s.contains(m)))
            .collect())
    }

    async fn smembers(&self, key: &str, limit: Option<usize>) -> Result<Vec<String>, StoreError> {
        let data = self.data.read();
        data.expect_kind(key, Kind::Set, self.now())?;
        Ok(data
            .sets
            .get(key)
            .map(|s| s.iter().take(limit.unwrap_or(usize::MAX)).cloned().collect())
            .unwrap_or_default())
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<bool, StoreError> {
        let reply = self.apply_one(StoreCommand::ZAdd {
            key: key.to_string(),
            score,
            member: member.to_string(),
        })?;
        Ok(reply.as_bool().unwrap_or_default())
    }

    async fn zrevrange_by_score(
        &self,
        key: &str,
        max: i64,
        min: i64,
        limit: Option<usize>,
    ) -> Result<Vec<(String, i64)>, StoreError> {
        let data = self.data.read();
        data.expect_kind(key, Kind::SortedSet, self.now())?;
        Ok(data
            .zsets
            .get(key)
            .map(|z| z.rev_range(max, min, limit))
            .unwrap_or_default())
    }

    async fn zrem_range_by_score(&self, key: &str, min: i64, max: i64) -> Result<u64, StoreError> {
        let reply = self.apply_one(StoreCommand::ZRemRangeByScore {
            key: key.to_string(),
            min,
            max,
        })?;
        Ok(reply.as_int().unwrap_or_default() as u64)
    }

    async fn zcard(&self, key: &str) -> Result<u64, StoreError> {
        let data = self.data.read();
        data.expect_kind(key, Kind::SortedSet, self.now())?;
        Ok(data.zsets.get(key).map_or(0, |z| z.scores.len() as u64))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.now();
        let data = self.data.read();
        data.expect_kind(key, Kind::String, now)?;
        Ok(data.live_string(key, now).map(|e| e.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.apply_one(StoreCommand::SetEx {
            key: key.to_string(),
            value: value.to_string(),
            ttl,
        })
        .map(|_| ())
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let reply = self.apply_one(StoreCommand::IncrBy {
            key: key.to_string(),
            delta,
        })?;
        Ok(reply.as_int().unwrap_or_default())
    }

    async fn execute(&self, pipeline: Pipeline) -> Result<Vec<CommandReply>, StoreError> {
        let now = self.now();
        let mut data = self.data.write();
        for command in pipeline.commands() {
            data.check(command, now)?;
        }
        pipeline
            .into_commands()
            .into_iter()
            .map(|command| data.apply(command, now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ManualClock;

    #[tokio::test]
    async fn test_hash_operations() {
        let store = InMemoryStore::new();
        store.hset("h", "a", "1").await.unwrap();
        assert_eq!(store.hget("h", "a").await.unwrap(), Some("1".into()));
        assert_eq!(store.hincr_by("h", "a", 4).await.unwrap(), 5);
        assert_eq!(store.hincr_by("h", "b", 2).await.unwrap(), 2);
        let all = store.hgetall("h").await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(store.hgetall("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_operations() {
        let store = InMemoryStore::new();
        assert!(store.sadd("s", "b").await.unwrap());
        assert!(store.sadd("s", "a").await.unwrap());
        assert!(!store.sadd("s", "a").await.unwrap());
        assert_eq!(store.scard("s").await.unwrap(), 2);
        assert!(store.sismember("s", "a").await.unwrap());
        assert_eq!(
            store
                .smismember("s", &["a".into(), "z".into(), "b".into()])
                .await
                .unwrap(),
            vec![true, false, true]
        );
        assert_eq!(store.smembers("s", None).await.unwrap(), vec!["a", "b"]);
        assert_eq!(store.smembers("s", Some(1)).await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_sorted_set_range_and_removal() {
        let store = InMemoryStore::new();
        for (score, member) in [(10, "a"), (20, "b"), (30, "c"), (40, "d")] {
            store.zadd("z", score, member).await.unwrap();
        }
        let range = store.zrevrange_by_score("z", 35, 15, None).await.unwrap();
        assert_eq!(range, vec![("c".to_string(), 30), ("b".to_string(), 20)]);

        let limited = store.zrevrange_by_score("z", i64::MAX, 0, Some(1)).await.unwrap();
        assert_eq!(limited, vec![("d".to_string(), 40)]);

        assert_eq!(store.zrem_range_by_score("z", i64::MIN, 20).await.unwrap(), 2);
        assert_eq!(store.zcard("z").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_zadd_rescores_existing_member() {
        let store = InMemoryStore::new();
        assert!(store.zadd("z", 1, "m").await.unwrap());
        assert!(!store.zadd("z", 9, "m").await.unwrap());
        let range = store.zrevrange_by_score("z", 100, 0, None).await.unwrap();
        assert_eq!(range, vec![("m".to_string(), 9)]);
    }

    #[tokio::test]
    async fn test_string_expiry_follows_clock() {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = InMemoryStore::with_clock(clock.clone());
        store.set_ex("k", "v", Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".into()));
        clock.advance(999);
        assert!(store.get("k").await.unwrap().is_some());
        clock.advance(1);
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_incr_restarts_after_expiry() {
        let clock = Arc::new(ManualClock::new(0));
        let store = InMemoryStore::with_clock(clock.clone());

        let mut pipe = Pipeline::new();
        pipe.incr_by("c", 1);
        pipe.expire("c", Duration::from_millis(100));
        let replies = store.execute(pipe).await.unwrap();
        assert_eq!(replies, vec![CommandReply::Int(1), CommandReply::Bool(true)]);
        assert_eq!(store.incr_by("c", 1).await.unwrap(), 2);

        clock.advance(100);
        assert_eq!(store.incr_by("c", 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_replies_in_order() {
        let store = InMemoryStore::new();
        let mut pipe = Pipeline::new();
        pipe.sadd("s", "x");
        pipe.sadd("s", "x");
        pipe.hincr_by("h", "n", 3);
        pipe.hset("h", "name", "v");
        let replies = store.execute(pipe).await.unwrap();
        assert_eq!(
            replies,
            vec![
                CommandReply::Bool(true),
                CommandReply::Bool(false),
                CommandReply::Int(3),
                CommandReply::Ok
            ]
        );
    }

    #[tokio::test]
    async fn test_pipeline_type_error_applies_nothing() {
        let store = InMemoryStore::new();
        store.hset("h", "f", "v").await.unwrap();

        let mut pipe = Pipeline::new();
        pipe.sadd("s", "x");
        pipe.sadd("h", "x");
        let err = store.execute(pipe).await.unwrap_err();
        assert!(matches!(err, StoreError::WrongType { .. }));
        assert_eq!(store.scard("s").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_wrong_type_on_read() {
        let store = InMemoryStore::new();
        store.sadd("s", "x").await.unwrap();
        assert!(matches!(
            store.hget("s", "x").await,
            Err(StoreError::WrongType { .. })
        ));
    }

    #[tokio::test]
    async fn test_corrupt_counter() {
        let store = InMemoryStore::new();
        store.hset("h", "n", "abc").await.unwrap();
        assert!(matches!(
            store.hincr_by("h", "n", 1).await,
            Err(StoreError::Corrupt { .. })
        ));
    }
}
