//! # Store Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Connection refused, reset or otherwise failed before a reply.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A read did not answer within its budget.
    #[error("store operation {operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// A write timed out: it may or may not have been applied.
    #[error("outcome of {operation} unknown after {timeout_ms}ms")]
    Ambiguous {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// Key holds a different data type than the command expects.
    #[error("wrong type for key {key}")]
    WrongType { key: String },

    /// Stored value could not be interpreted.
    #[error("corrupt value at {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

impl StoreError {
    /// Errors worth retrying for idempotent reads.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout { .. })
    }

    /// Network-level failures, as opposed to data problems.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Timeout { .. } | Self::Ambiguous { .. }
        )
    }
}
