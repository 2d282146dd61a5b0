//! API error taxonomy.
//!
//! Every failure a client can see has a stable machine-readable `code`.
//! Expected game outcomes (already claimed, unclaimable) are not errors and
//! never pass through here.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{json, Value};
use shared_store::StoreError;
use tc_03_batch_validation::ValidationError;
use tc_04_claim_ledger::LedgerError;
use tc_06_aggregation::AggregationError;

/// Machine-readable error codes.
pub mod codes {
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Error returned to API clients.
///
/// Serialises as `{"success": false, "code", "message", ...data}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    pub data: Option<Value>,
}

impl ApiError {
    pub fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn validation(err: &ValidationError) -> Self {
        Self::new(400, codes::VALIDATION_FAILED, err.to_string())
            .with_data(json!({ "field": err.field() }))
    }

    /// Request body that is not JSON or not an object.
    pub fn malformed_body(reason: impl fmt::Display) -> Self {
        Self::new(400, codes::VALIDATION_FAILED, format!("malformed body: {reason}"))
            .with_data(json!({ "field": "body" }))
    }

    pub fn rate_limited(retry_after_ms: u64) -> Self {
        Self::new(429, codes::RATE_LIMITED, "Too many requests")
            .with_data(json!({ "retryAfterMs": retry_after_ms }))
    }

    /// Network failures map to 503, data problems to 500. The message stays
    /// generic; detail is attached only when `expose` is set.
    pub fn store(err: &StoreError, expose: bool) -> Self {
        let status = if err.is_network() { 503 } else { 500 };
        let error = Self::new(status, codes::STORE_UNAVAILABLE, "Storage temporarily unavailable");
        if expose {
            error.with_data(json!({ "detail": err.to_string() }))
        } else {
            error
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(404, codes::NOT_FOUND, format!("{} not found", what.into()))
    }

    pub fn internal(detail: impl fmt::Display, expose: bool) -> Self {
        let error = Self::new(500, codes::INTERNAL_ERROR, "Internal error");
        if expose {
            error.with_data(json!({ "detail": detail.to_string() }))
        } else {
            error
        }
    }

    pub fn from_ledger(err: LedgerError, expose: bool) -> Self {
        match err {
            LedgerError::Store(e) => Self::store(&e, expose),
            other => Self::internal(other, expose),
        }
    }

    pub fn from_aggregation(err: AggregationError, expose: bool) -> Self {
        match err {
            AggregationError::Store(e) => Self::store(&e, expose),
            other => Self::internal(other, expose),
        }
    }

    /// `Retry-After` in whole seconds, rounded up.
    pub fn retry_after_secs(&self) -> Option<u64> {
        let ms = self.data.as_ref()?.get("retryAfterMs")?.as_u64()?;
        Some(ms.div_ceil(1000))
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::validation(&err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}] {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("success", &false)?;
        map.serialize_entry("code", self.code)?;
        map.serialize_entry("message", &self.message)?;
        if let Some(Value::Object(data)) = &self.data {
            for (key, value) in data {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::CellKeyError;

    #[test]
    fn test_validation_names_field() {
        let err = ApiError::from(ValidationError::InvalidCellKey(CellKeyError::Malformed));
        assert_eq!(err.status, 400);
        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["field"], "cellKey");
        assert_eq!(body["success"], false);
    }

    #[test]
    fn test_rate_limited_retry_after_rounds_up() {
        let err = ApiError::rate_limited(1_001);
        assert_eq!(err.status, 429);
        assert_eq!(err.retry_after_secs(), Some(2));
        assert_eq!(serde_json::to_value(&err).unwrap()["retryAfterMs"], 1_001);
    }

    #[test]
    fn test_store_detail_only_when_exposed() {
        let cause = StoreError::Unavailable("connection refused".into());

        let hidden = ApiError::store(&cause, false);
        assert_eq!(hidden.status, 503);
        assert!(!serde_json::to_string(&hidden).unwrap().contains("refused"));

        let exposed = ApiError::store(&cause, true);
        assert!(serde_json::to_string(&exposed).unwrap().contains("refused"));
    }

    #[test]
    fn test_corrupt_data_is_500() {
        let cause = StoreError::Corrupt {
            key: "stats:totals".into(),
            reason: "not an integer".into(),
        };
        assert_eq!(ApiError::store(&cause, false).status, 500);
    }

    #[test]
    fn test_ledger_encode_failure_is_internal() {
        let err = ApiError::from_ledger(
            LedgerError::Encode {
                what: "pixel value",
                reason: "boom".into(),
            },
            false,
        );
        assert_eq!(err.code, codes::INTERNAL_ERROR);
        assert!(err.data.is_none());
    }
}
