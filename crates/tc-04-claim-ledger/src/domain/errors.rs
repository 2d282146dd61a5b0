//! Ledger errors.
//!
//! Already-claimed and unclaimable cells are outcomes, not errors.

use shared_store::StoreError;
use tc_05_timeline_index::TimelineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The store call failed. After a grouped write the caller cannot tell
    /// whether anything landed.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not encode {what}: {reason}")]
    Encode { what: &'static str, reason: String },
}

impl From<TimelineError> for LedgerError {
    fn from(err: TimelineError) -> Self {
        match err {
            TimelineError::Store(e) => Self::Store(e),
            TimelineError::Encode(reason) => Self::Encode {
                what: "timeline entry",
                reason,
            },
        }
    }
}
