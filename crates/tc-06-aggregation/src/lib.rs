//! # TC-06 Aggregation
//!
//! Leaderboard, per-country completion, recent activity and world state,
//! derived on demand from ledger state.
//!
//! Actor ids are replaced by `display_handle` before anything is returned.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod cache;
pub mod domain;
pub mod service;

pub use cache::TtlCache;
pub use domain::{
    display_handle, ActivityItem, ActorStats, AggregationConfig, AggregationError, CountryStat,
    LeaderboardEntry, LeaderboardView, WorldState, WorldTotals, WORLD_TOTAL_CELLS,
};
pub use service::AggregationService;
