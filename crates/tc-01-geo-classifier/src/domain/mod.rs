pub mod address;
pub mod config;
pub mod countries;
pub mod errors;
pub mod heuristics;

pub use address::RawAddress;
pub use config::GeoClassifierConfig;
pub use countries::{flag_emoji, CountryInfo, CountryTable, DEFAULT_TOTAL_CELLS};
pub use errors::GeocodeError;
pub use heuristics::classify_locally;
