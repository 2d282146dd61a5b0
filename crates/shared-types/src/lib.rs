//! # Shared Types Crate
//!
//! Domain entities used by more than one TerraClaim subsystem: cell identity,
//! territory classification, pixel values, timeline entries and the clock
//! abstraction.
//!
//! ## Design Principles
//!
//! - **One cell, one key**: `CellKey` is the only way to name a cell.
//! - **Injected time**: nothing reads the wall clock except `SystemTimeSource`.

pub mod duration_serde;
pub mod entities;
pub mod errors;
pub mod stats;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use stats::percentage;
pub use time::{ManualClock, SystemTimeSource, TimeSource, Timestamp};
