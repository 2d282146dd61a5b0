use shared_store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not encode timeline entry: {0}")]
    Encode(String),
}
