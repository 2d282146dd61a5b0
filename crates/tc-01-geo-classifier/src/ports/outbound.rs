//! # Outbound Ports (Driven Ports)

use std::time::Duration;

use async_trait::async_trait;
use shared_types::Coordinate;

use crate::domain::{GeocodeError, RawAddress};

/// One reverse-geocoding endpoint.
///
/// Production: `NominatimGeocoder` (adapters/nominatim.rs)
/// Testing: `CountingGeocoder` (testing.rs)
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_lookup(
        &self,
        coord: Coordinate,
        timeout: Duration,
    ) -> Result<RawAddress, GeocodeError>;

    /// Identifies the mirror in logs.
    fn endpoint(&self) -> &str;
}
