//! Zero-I/O classification for large open-water regions and polar caps.
//!
//! Boxes are deliberately conservative: each one sits well inside an ocean so
//! a coastline is never misread as water. Anything not matched here goes to
//! the reverse geocoder.

use shared_types::{Classification, Coordinate};

/// Everything south of this latitude is Antarctica.
pub const ANTARCTIC_LATITUDE: f64 = -60.0;

/// Everything at or north of this latitude is the Arctic ice cap.
pub const ARCTIC_LATITUDE: f64 = 85.0;

#[derive(Debug, Clone, Copy)]
struct WaterBox {
    name: &'static str,
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

impl WaterBox {
    fn contains(&self, coord: &Coordinate) -> bool {
        coord.lat >= self.min_lat
            && coord.lat <= self.max_lat
            && coord.lng >= self.min_lng
            && coord.lng <= self.max_lng
    }
}

const OPEN_WATER: &[WaterBox] = &[
    WaterBox { name: "north_pacific", min_lat: 25.0, max_lat: 48.0, min_lng: -178.0, max_lng: -130.0 },
    WaterBox { name: "equatorial_pacific", min_lat: -5.0, max_lat: 5.0, min_lng: -175.0, max_lng: -95.0 },
    WaterBox { name: "south_pacific", min_lat: -60.0, max_lat: -30.0, min_lng: -175.0, max_lng: -80.0 },
    WaterBox { name: "north_atlantic", min_lat: 10.0, max_lat: 35.0, min_lng: -60.0, max_lng: -35.0 },
    WaterBox { name: "south_atlantic", min_lat: -50.0, max_lat: -42.0, min_lng: -30.0, max_lng: 5.0 },
    WaterBox { name: "indian_ocean", min_lat: -35.0, max_lat: -15.0, min_lng: 65.0, max_lng: 105.0 },
];

/// Classify without any I/O, or `None` when the coordinate needs a lookup.
pub fn classify_locally(coord: &Coordinate) -> Option<Classification> {
    if coord.lat < ANTARCTIC_LATITUDE {
        return Some(Classification::antarctica());
    }
    if coord.lat >= ARCTIC_LATITUDE {
        return Some(Classification::international_waters());
    }
    OPEN_WATER
        .iter()
        .find(|b| b.contains(coord))
        .map(|b| {
            tracing::trace!(region = b.name, lat = coord.lat, lng = coord.lng, "open-water heuristic hit");
            Classification::water()
        })
}
