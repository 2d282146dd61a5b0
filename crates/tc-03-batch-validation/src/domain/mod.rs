pub mod config;
pub mod entries;
pub mod errors;

pub use config::ValidationConfig;
pub use entries::{PixelEntry, ValidatedCells, ValidatedPixels};
pub use errors::ValidationError;
