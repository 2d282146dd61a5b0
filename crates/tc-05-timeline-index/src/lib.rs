//! # TC-05 Timeline Index
//!
//! Time-ordered log of accepted claims and paints.
//!
//! - `append` / `append_command` add an entry, alone or inside a grouped write
//! - `range_since(from, to)` returns entries newest first
//! - `prune_older_than(cutoff)` removes entries strictly below `cutoff`
//! - `online_actors(now)` counts distinct actors in the online window, floored at 1

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod service;

pub use domain::{TimelineConfig, TimelineError};
pub use service::TimelineIndex;
