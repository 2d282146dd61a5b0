//! # TC-01 Geo Classifier
//!
//! Maps a coordinate to a territory type and country code.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): heuristics, country table, address mapping, config
//! - **Ports Layer** (`ports/`)
//!   - `TerritoryClassifier`: driving port used by the claim ledger
//!   - `ReverseGeocoder`: driven port, one instance per mirror
//! - **Service Layer** (`service.rs`): `GeoClassifier`, the only classifier
//!   used anywhere in the engine
//! - **Adapters Layer** (`adapters/`): `NominatimGeocoder` over HTTP
//!
//! ## Degradation
//!
//! When the cache is unreachable the classifier behaves as if it missed.
//! When every mirror fails it answers `Unknown` instead of an error; whether
//! an unknown cell is claimable is the ledger's policy.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod testing;

pub use adapters::NominatimGeocoder;
pub use domain::{
    classify_locally, flag_emoji, CountryInfo, CountryTable, GeoClassifierConfig, GeocodeError,
    RawAddress, DEFAULT_TOTAL_CELLS,
};
pub use ports::{ReverseGeocoder, TerritoryClassifier};
pub use service::{GeoClassifier, GeoStats};
