//! Validation errors.
//!
//! These reject a whole request. Entries dropped inside an otherwise valid
//! batch are not errors; they only add to `rejected_count`.

use shared_types::CellKeyError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be an array")]
    NotASequence { field: &'static str },

    #[error("{field} must not be empty")]
    EmptyBatch { field: &'static str },

    #[error("{field} has {actual} entries, maximum is {max}")]
    BatchTooLarge {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("cellKey is invalid: {0}")]
    InvalidCellKey(#[from] CellKeyError),
}

impl ValidationError {
    /// Name of the offending request field, as the client sent it.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NotASequence { field }
            | Self::EmptyBatch { field }
            | Self::BatchTooLarge { field, .. }
            | Self::MissingField { field }
            | Self::InvalidField { field, .. } => field,
            Self::InvalidCellKey(_) => "cellKey",
        }
    }
}
