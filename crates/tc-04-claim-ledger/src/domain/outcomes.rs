//! Results returned by ledger operations.

use serde::Serialize;
use shared_types::{CountryCode, TerritoryType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    Claimed,
    AlreadyClaimed,
    Unclaimable,
}

impl ClaimOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claimed => "claimed",
            Self::AlreadyClaimed => "already_claimed",
            Self::Unclaimable => "unclaimable",
        }
    }
}

/// Result of a single-cell claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResult {
    pub outcome: ClaimOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<CountryCode>,
    /// Territory type; set for claimed and unclaimable cells.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub territory: Option<TerritoryType>,
    /// Country completion after this claim, two decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_claim: Option<bool>,
}

impl ClaimResult {
    pub fn already_claimed() -> Self {
        Self {
            outcome: ClaimOutcome::AlreadyClaimed,
            country: None,
            territory: None,
            percentage: None,
            first_claim: None,
        }
    }

    pub fn unclaimable(territory: TerritoryType) -> Self {
        Self {
            outcome: ClaimOutcome::Unclaimable,
            country: None,
            territory: Some(territory),
            percentage: None,
            first_claim: None,
        }
    }
}

/// Result of a cell batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchClaimResult {
    /// Cells written by this batch.
    pub processed: usize,
    /// Cells skipped because they were already claimed or repeated in the batch.
    pub already_claimed: usize,
    /// Cells skipped because their territory cannot be claimed.
    pub unclaimable: usize,
    /// Global claimed-cell counter after the write.
    pub total_after: u64,
    pub online_actors: u64,
}

/// Result of a paint batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintResult {
    pub processed: usize,
    /// Global painted-pixel counter after the write.
    pub total_pixels: u64,
    pub online_actors: u64,
}
