pub mod config;
pub mod errors;

pub use config::TimelineConfig;
pub use errors::TimelineError;
