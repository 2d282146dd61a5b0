use shared_store::StoreError;
use tc_05_timeline_index::TimelineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("timeline entry could not be encoded: {0}")]
    Timeline(String),
}

impl From<TimelineError> for AggregationError {
    fn from(err: TimelineError) -> Self {
        match err {
            TimelineError::Store(e) => Self::Store(e),
            TimelineError::Encode(reason) => Self::Timeline(reason),
        }
    }
}
