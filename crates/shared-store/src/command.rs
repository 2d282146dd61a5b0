//! # Grouped Writes
//!
//! A `Pipeline` is a list of mutations submitted in one round trip. The store
//! guarantees the round trip succeeds or fails as a whole; it gives no
//! isolation against another pipeline touching the same keys.

use std::time::Duration;

/// One mutation inside a grouped write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    HSet {
        key: String,
        field: String,
        value: String,
    },
    HIncrBy {
        key: String,
        field: String,
        delta: i64,
    },
    SAdd {
        key: String,
        member: String,
    },
    ZAdd {
        key: String,
        score: i64,
        member: String,
    },
    /// Inclusive on both bounds.
    ZRemRangeByScore {
        key: String,
        min: i64,
        max: i64,
    },
    IncrBy {
        key: String,
        delta: i64,
    },
    SetEx {
        key: String,
        value: String,
        ttl: Duration,
    },
    Expire {
        key: String,
        ttl: Duration,
    },
}

impl StoreCommand {
    pub fn key(&self) -> &str {
        match self {
            Self::HSet { key, .. }
            | Self::HIncrBy { key, .. }
            | Self::SAdd { key, .. }
            | Self::ZAdd { key, .. }
            | Self::ZRemRangeByScore { key, .. }
            | Self::IncrBy { key, .. }
            | Self::SetEx { key, .. }
            | Self::Expire { key, .. } => key,
        }
    }
}

/// Reply to one command, in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandReply {
    Ok,
    /// New value of a counter, or number of removed members.
    Int(i64),
    /// Whether a member was newly added or an expiry was set.
    Bool(bool),
}

impl CommandReply {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// Builder for a grouped write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    commands: Vec<StoreCommand>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: StoreCommand) -> usize {
        self.commands.push(command);
        self.commands.len() - 1
    }

    pub fn hset(&mut self, key: impl Into<String>, field: impl Into<String>, value: impl Into<String>) -> usize {
        self.push(StoreCommand::HSet {
            key: key.into(),
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn hincr_by(&mut self, key: impl Into<String>, field: impl Into<String>, delta: i64) -> usize {
        self.push(StoreCommand::HIncrBy {
            key: key.into(),
            field: field.into(),
            delta,
        })
    }

    pub fn sadd(&mut self, key: impl Into<String>, member: impl Into<String>) -> usize {
        self.push(StoreCommand::SAdd {
            key: key.into(),
            member: member.into(),
        })
    }

    pub fn zadd(&mut self, key: impl Into<String>, score: i64, member: impl Into<String>) -> usize {
        self.push(StoreCommand::ZAdd {
            key: key.into(),
            score,
            member: member.into(),
        })
    }

    pub fn zrem_range_by_score(&mut self, key: impl Into<String>, min: i64, max: i64) -> usize {
        self.push(StoreCommand::ZRemRangeByScore {
            key: key.into(),
            min,
            max,
        })
    }

    pub fn incr_by(&mut self, key: impl Into<String>, delta: i64) -> usize {
        self.push(StoreCommand::IncrBy {
            key: key.into(),
            delta,
        })
    }

    pub fn set_ex(&mut self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) -> usize {
        self.push(StoreCommand::SetEx {
            key: key.into(),
            value: value.into(),
            ttl,
        })
    }

    pub fn expire(&mut self, key: impl Into<String>, ttl: Duration) -> usize {
        self.push(StoreCommand::Expire {
            key: key.into(),
            ttl,
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[StoreCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<StoreCommand> {
        self.commands
    }
}
