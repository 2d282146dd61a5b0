//! Display forms returned by the aggregation service.

use serde::Serialize;
use sha2::{Digest, Sha256};
use shared_types::{ActorId, CountryCode, Timestamp};

/// Public handle for an actor id. Raw ids never leave the service.
pub fn display_handle(actor_id: &str) -> String {
    let digest = Sha256::digest(actor_id.as_bytes());
    format!("Explorer-{}", hex::encode_upper(&digest[..3]))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub handle: String,
    pub score: u64,
    #[serde(skip)]
    pub actor_id: ActorId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryStat {
    pub code: CountryCode,
    pub name: String,
    pub flag: String,
    pub revealed_count: u64,
    pub total_cells: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub timestamp: Timestamp,
    pub cell: String,
    pub country: CountryCode,
    pub country_name: String,
    pub flag: String,
    pub handle: String,
}

/// Slowly changing global figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldTotals {
    pub total_claimed: u64,
    pub total_pixels: u64,
    pub countries_claimed: u64,
    pub world_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardView {
    pub countries: Vec<CountryStat>,
    pub actors: Vec<LeaderboardEntry>,
    pub recent_activity: Vec<ActivityItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    /// Claimed cells in canonical order, capped.
    pub claimed_cells: Vec<String>,
    pub country_stats: Vec<CountryStat>,
    pub total_claimed: u64,
    pub total_pixels: u64,
    pub world_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorStats {
    pub handle: String,
    pub score: u64,
    pub claimed_cells: u64,
    pub pixels_painted: u64,
    /// Leaderboard position; `None` until the actor has claimed a cell.
    pub rank: Option<usize>,
}
