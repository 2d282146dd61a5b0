//! # Batch Validator
//!
//! Whole-batch checks run first and reject the request outright: the batch
//! must be an array with between 1 and `max_batch_size` entries. Only then is
//! each entry inspected on its own; a bad entry is dropped and counted, never
//! fatal.

use serde_json::Value;
use shared_types::CellKey;
use tracing::debug;

use crate::domain::{
    PixelEntry, ValidatedCells, ValidatedPixels, ValidationConfig, ValidationError,
};

/// Opacity used when a pixel entry omits it.
pub const DEFAULT_OPACITY: f32 = 1.0;

#[derive(Debug, Clone, Default)]
pub struct BatchValidator {
    config: ValidationConfig,
}

impl BatchValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single cell key; the only entry point for client cell strings.
    pub fn validate_cell_key(&self, raw: &str) -> Result<CellKey, ValidationError> {
        Ok(CellKey::parse(raw)?)
    }

    /// Actor ids are opaque but must be non-empty, bounded and printable.
    pub fn validate_actor_id(&self, raw: &str) -> Result<String, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingField { field: "actorId" });
        }
        if trimmed.len() > self.config.max_actor_id_len {
            return Err(ValidationError::InvalidField {
                field: "actorId",
                reason: format!("longer than {} bytes", self.config.max_actor_id_len),
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::InvalidField {
                field: "actorId",
                reason: "contains control characters".into(),
            });
        }
        Ok(trimmed.to_string())
    }

    /// Validate a cell batch. Entries must be `"lat,lng"` strings.
    pub fn validate_cells(&self, batch: &Value) -> Result<ValidatedCells, ValidationError> {
        let entries = self.check_shape(batch, "cells")?;

        let mut result = ValidatedCells::default();
        for entry in entries {
            match entry.as_str().map(CellKey::parse) {
                Some(Ok(cell)) => result.accepted.push(cell),
                Some(Err(e)) => {
                    debug!(entry = %entry, error = %e, "dropping cell entry");
                    result.rejected_count += 1;
                }
                None => {
                    debug!(entry = %entry, "dropping non-string cell entry");
                    result.rejected_count += 1;
                }
            }
        }
        Ok(result)
    }

    /// Validate a pixel batch. Entries must be objects with a non-empty
    /// `position` and `color`; `opacity` is optional and clamped to `[0, 1]`.
    pub fn validate_pixels(&self, batch: &Value) -> Result<ValidatedPixels, ValidationError> {
        let entries = self.check_shape(batch, "pixels")?;

        let mut result = ValidatedPixels::default();
        for entry in entries {
            match self.pixel_entry(entry) {
                Some(pixel) => result.accepted.push(pixel),
                None => {
                    debug!(entry = %entry, "dropping pixel entry");
                    result.rejected_count += 1;
                }
            }
        }
        Ok(result)
    }

    fn check_shape<'a>(
        &self,
        batch: &'a Value,
        field: &'static str,
    ) -> Result<&'a Vec<Value>, ValidationError> {
        let entries = batch
            .as_array()
            .ok_or(ValidationError::NotASequence { field })?;
        if entries.is_empty() {
            return Err(ValidationError::EmptyBatch { field });
        }
        if entries.len() > self.config.max_batch_size {
            return Err(ValidationError::BatchTooLarge {
                field,
                max: self.config.max_batch_size,
                actual: entries.len(),
            });
        }
        Ok(entries)
    }

    fn pixel_entry(&self, entry: &Value) -> Option<PixelEntry> {
        let object = entry.as_object()?;
        let position = bounded_text(object.get("position")?, self.config.max_position_len)?;
        let color = bounded_text(object.get("color")?, self.config.max_color_len)?;
        let opacity = match object.get("opacity") {
            None | Some(Value::Null) => DEFAULT_OPACITY,
            Some(value) => (value.as_f64()? as f32).clamp(0.0, 1.0),
        };
        Some(PixelEntry {
            position,
            color,
            opacity,
        })
    }
}

fn bounded_text(value: &Value, max_len: usize) -> Option<String> {
    let text = value.as_str()?.trim();
    if text.is_empty() || text.len() > max_len || text.chars().any(char::is_control) {
        return None;
    }
    Some(text.to_string())
}
