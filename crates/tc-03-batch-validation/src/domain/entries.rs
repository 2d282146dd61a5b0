//! Validated batch contents.

use serde::{Deserialize, Serialize};
use shared_types::CellKey;

/// Cell batch after per-entry checks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatedCells {
    pub accepted: Vec<CellKey>,
    pub rejected_count: usize,
}

/// One paint instruction that passed per-entry checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelEntry {
    pub position: String,
    pub color: String,
    /// Always within `[0, 1]`.
    pub opacity: f32,
}

/// Pixel batch after per-entry checks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidatedPixels {
    pub accepted: Vec<PixelEntry>,
    pub rejected_count: usize,
}
