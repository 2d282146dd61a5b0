//! # TC-03 Batch Validation
//!
//! Turns raw client batches into canonical, bounded entries.
//!
//! - `validate_cells` / `validate_pixels` return `{accepted, rejected_count}`
//!   or a `ValidationError` when the batch itself is malformed.
//! - Cell strings become `CellKey`s here, before any store access.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod service;

pub use domain::{PixelEntry, ValidatedCells, ValidatedPixels, ValidationConfig, ValidationError};
pub use service::{BatchValidator, DEFAULT_OPACITY};
