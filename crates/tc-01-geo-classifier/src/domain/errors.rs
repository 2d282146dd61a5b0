//! Reverse-geocoding failures.
//!
//! None of these fail a claim: the classifier degrades to `Unknown`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("mirror {mirror} did not answer within {timeout_ms}ms")]
    Timeout { mirror: String, timeout_ms: u64 },

    #[error("mirror {mirror} returned HTTP {status}")]
    Http { mirror: String, status: u16 },

    #[error("mirror {mirror} unreachable: {reason}")]
    Network { mirror: String, reason: String },

    #[error("mirror {mirror} sent an unreadable body: {reason}")]
    Malformed { mirror: String, reason: String },

    #[error("no geocoder mirrors configured")]
    NoMirrors,

    #[error("HTTP client for mirror {mirror} could not be built: {reason}")]
    Client { mirror: String, reason: String },
}

impl GeocodeError {
    /// Label used for the `result` metric dimension.
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Http { .. } => "http_error",
            Self::Network { .. } => "network_error",
            Self::Malformed { .. } => "malformed",
            Self::NoMirrors => "no_mirrors",
            Self::Client { .. } => "client_error",
        }
    }
}
