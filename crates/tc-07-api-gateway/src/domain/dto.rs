//! Request and response bodies.
//!
//! Batch fields are kept as raw JSON so the validator sees exactly what the
//! client sent and can reject non-arrays itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{CountryCode, TerritoryType};
use tc_01_geo_classifier::CountryTable;
use tc_04_claim_ledger::{ClaimOutcome, ClaimResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClaimRequest {
    pub cell_key: String,
    pub actor_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchClaimRequest {
    pub cells: Value,
    pub actor_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaintBatchRequest {
    pub pixels: Value,
    pub actor_id: String,
}

/// Single-claim result. `success` is false for already-claimed and
/// unclaimable cells; `outcome` says which.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub success: bool,
    pub outcome: ClaimOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<CountryCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub territory: Option<TerritoryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_claim: Option<bool>,
}

impl ClaimResponse {
    pub fn from_result(result: ClaimResult, countries: &CountryTable) -> Self {
        let info = result.country.as_ref().map(|code| countries.info(code));
        Self {
            success: result.outcome == ClaimOutcome::Claimed,
            outcome: result.outcome,
            country_name: info.as_ref().map(|i| i.name.clone()),
            flag: info.map(|i| i.flag),
            country: result.country,
            territory: result.territory,
            percentage: result.percentage,
            first_claim: result.first_claim,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchClaimResponse {
    pub success: bool,
    pub processed: usize,
    /// Entries dropped by validation.
    pub rejected: usize,
    pub total_claimed: u64,
    pub online_actors: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintBatchResponse {
    pub success: bool,
    pub processed: usize,
    pub rejected: usize,
    pub total_pixels: u64,
    pub online_actors: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let request: BatchClaimRequest = serde_json::from_str(r#"{"actorId": "a"}"#).unwrap();
        assert!(request.cells.is_null());
        assert_eq!(request.actor_id, "a");
    }

    #[test]
    fn test_claimed_response_shape() {
        let result = ClaimResult {
            outcome: ClaimOutcome::Claimed,
            country: Some(CountryCode::new("FR")),
            territory: Some(TerritoryType::Land),
            percentage: Some(0.02),
            first_claim: Some(true),
        };
        let response = ClaimResponse::from_result(result, &CountryTable::builtin());
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["outcome"], "claimed");
        assert_eq!(body["country"], "FR");
        assert_eq!(body["countryName"], "France");
        assert_eq!(body["firstClaim"], true);
    }

    #[test]
    fn test_already_claimed_is_not_success() {
        let response =
            ClaimResponse::from_result(ClaimResult::already_claimed(), &CountryTable::builtin());
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["outcome"], "already_claimed");
        assert!(body.get("country").is_none());
    }
}
