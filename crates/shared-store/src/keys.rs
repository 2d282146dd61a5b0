//! # Key Schema
//!
//! Every store key the engine touches. Members and fields that name cells are
//! always canonical `CellKey` strings.

/// Set of every claimed cell.
pub const CLAIMED_CELLS: &str = "cells:claimed";

/// Set of country codes with at least one claimed cell.
pub const CLAIMED_COUNTRIES: &str = "countries:claimed";

/// Hash: actor id -> claim count.
pub const ACTOR_SCORES: &str = "actors:scores";

/// Hash: actor id -> paint count.
pub const ACTOR_PIXELS: &str = "actors:pixels";

/// Hash of global counters.
pub const TOTALS: &str = "stats:totals";
pub const TOTAL_CLAIMED_FIELD: &str = "claimed";
pub const TOTAL_PIXELS_FIELD: &str = "pixels";

/// Hash: position -> JSON `PixelValue`.
pub const PIXELS: &str = "pixels:state";

/// Hash: color -> paint count.
pub const PIXEL_COLORS: &str = "pixels:colors";

/// Sorted sets of JSON `TimelineEntry`, scored by timestamp.
pub const CELL_TIMELINE: &str = "timeline:cells";
pub const PIXEL_TIMELINE: &str = "timeline:pixels";

/// Set of cells claimed inside one country.
pub fn country_cells(code: &str) -> String {
    format!("country:{code}:cells")
}

/// Set of cells claimed by one actor.
pub fn actor_cells(actor_id: &str) -> String {
    format!("actor:{actor_id}:cells")
}

/// Cached classification for one grid square.
pub fn geo_cache(grid: &str) -> String {
    format!("geo:{grid}")
}

/// Fixed-window request counter for one client.
pub fn rate_window(client_key: &str, bucket: u64) -> String {
    format!("ratelimit:{client_key}:{bucket}")
}
