pub mod config;
pub mod errors;
pub mod views;

pub use config::{AggregationConfig, WORLD_TOTAL_CELLS};
pub use errors::AggregationError;
pub use views::{
    display_handle, ActivityItem, ActorStats, CountryStat, LeaderboardEntry, LeaderboardView,
    WorldState, WorldTotals,
};
