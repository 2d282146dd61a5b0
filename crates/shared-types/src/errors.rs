//! # Error Types
//!
//! Errors shared by every subsystem that handles cell identity.

use thiserror::Error;

/// Reasons a string or coordinate cannot become a [`crate::CellKey`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellKeyError {
    /// Does not match `-?digits.digits,-?digits.digits`.
    #[error("cell key must look like \"lat,lng\" with decimal components")]
    Malformed,

    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// Rejected configuration values. Every subsystem config's `validate()` returns this.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Size or count limit is unusable
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Timeout, window or TTL is unusable
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
    /// Endpoint list or address is unusable
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Environment variable could not be parsed
    #[error("invalid value for {var}: {value}")]
    InvalidEnv { var: String, value: String },
}
