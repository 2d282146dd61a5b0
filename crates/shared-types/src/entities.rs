//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Geography**: `Coordinate`, `CellKey`, `TerritoryType`, `CountryCode`, `Classification`
//! - **Canvas**: `PixelValue`
//! - **Activity**: `TimelineEntry`
//!
//! ## Cell identity
//!
//! A cell is identified by exactly one canonical string. Every boundary that
//! touches the shared store goes through [`CellKey::parse`] or
//! [`CellKey::from_coordinate`], so two spellings of the same point
//! (`"1.5,2.00000"` and `"1.50000,2"`) can never produce two members.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CellKeyError;
use crate::time::Timestamp;

/// Number of decimal places kept in a canonical cell key.
pub const CELL_PRECISION: u32 = 4;

/// `10^CELL_PRECISION`, the scale between degrees and cell units.
const CELL_SCALE: i64 = 10_i64.pow(CELL_PRECISION);

/// Latitude bound in degrees.
pub const MAX_LATITUDE: f64 = 90.0;

/// Longitude bound in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Opaque caller-supplied actor identifier. Not authenticated.
pub type ActorId = String;

// =============================================================================
// CLUSTER A: GEOGRAPHY
// =============================================================================

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite and within the WGS84 bounds.
    pub fn is_in_range(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= MAX_LATITUDE
            && self.lng.abs() <= MAX_LONGITUDE
    }

    /// Snap to a grid of `precision` decimal places.
    ///
    /// Used for cache keys, where nearby points must share one entry.
    pub fn grid_key(&self, precision: u32) -> String {
        let scale = 10_f64.powi(precision as i32);
        let lat = (self.lat * scale).round() / scale;
        let lng = (self.lng * scale).round() / scale;
        // `+ 0.0` folds -0.0 into 0.0 so both sides of the equator share a key.
        format!(
            "{:.p$},{:.p$}",
            lat + 0.0,
            lng + 0.0,
            p = precision as usize
        )
    }
}

/// Canonical identity of a claimable cell.
///
/// Stored as scaled integers so equality and hashing never depend on float
/// formatting; the string form is computed once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    lat_units: i64,
    lng_units: i64,
    canonical: String,
}

impl CellKey {
    /// Parse a client-supplied `lat,lng` string.
    ///
    /// Accepts only `-?digits.digits,-?digits.digits` with both components in
    /// range. Extra fraction digits are rounded half away from zero on the
    /// decimal digits themselves, not on the binary float.
    pub fn parse(raw: &str) -> Result<Self, CellKeyError> {
        let (lat_raw, lng_raw) = raw
            .split_once(',')
            .ok_or(CellKeyError::Malformed)?;

        let lat = DecimalParts::parse(lat_raw).ok_or(CellKeyError::Malformed)?;
        let lng = DecimalParts::parse(lng_raw).ok_or(CellKeyError::Malformed)?;

        let lat_value: f64 = lat_raw.parse().map_err(|_| CellKeyError::Malformed)?;
        let lng_value: f64 = lng_raw.parse().map_err(|_| CellKeyError::Malformed)?;

        if !lat_value.is_finite() || lat_value.abs() > MAX_LATITUDE {
            return Err(CellKeyError::LatitudeOutOfRange(lat_value));
        }
        if !lng_value.is_finite() || lng_value.abs() > MAX_LONGITUDE {
            return Err(CellKeyError::LongitudeOutOfRange(lng_value));
        }

        Ok(Self::from_units(lat.to_units(), lng.to_units()))
    }

    /// Build a key from a coordinate, rounding to [`CELL_PRECISION`].
    pub fn from_coordinate(coord: Coordinate) -> Result<Self, CellKeyError> {
        if !coord.lat.is_finite() || coord.lat.abs() > MAX_LATITUDE {
            return Err(CellKeyError::LatitudeOutOfRange(coord.lat));
        }
        if !coord.lng.is_finite() || coord.lng.abs() > MAX_LONGITUDE {
            return Err(CellKeyError::LongitudeOutOfRange(coord.lng));
        }
        let lat_units = (coord.lat * CELL_SCALE as f64).round() as i64;
        let lng_units = (coord.lng * CELL_SCALE as f64).round() as i64;
        Ok(Self::from_units(lat_units, lng_units))
    }

    fn from_units(lat_units: i64, lng_units: i64) -> Self {
        let canonical = format!("{},{}", format_units(lat_units), format_units(lng_units));
        Self {
            lat_units,
            lng_units,
            canonical,
        }
    }

    /// The canonical string, used verbatim as a store member.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Centre of the cell in decimal degrees.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat_units as f64 / CELL_SCALE as f64,
            lng: self.lng_units as f64 / CELL_SCALE as f64,
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for CellKey {
    type Err = CellKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CellKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.canonical)
    }
}

impl<'de> Deserialize<'de> for CellKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        CellKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Sign, integer digits and fraction digits of a strictly formatted decimal.
struct DecimalParts<'a> {
    negative: bool,
    integer: &'a str,
    fraction: &'a str,
}

impl<'a> DecimalParts<'a> {
    /// Match `-?[0-9]+\.[0-9]+` exactly.
    fn parse(s: &'a str) -> Option<Self> {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (integer, fraction) = body.split_once('.')?;
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(integer) || !all_digits(fraction) {
            return None;
        }
        Some(Self {
            negative,
            integer,
            fraction,
        })
    }

    /// Scaled integer value, rounded half away from zero at the first dropped digit.
    ///
    /// Callers range-check first, so the integer part has at most three
    /// significant digits once leading zeros are gone.
    fn to_units(&self) -> i64 {
        let integer: i64 = self
            .integer
            .trim_start_matches('0')
            .parse()
            .unwrap_or(0);

        let digits = self.fraction.as_bytes();
        let mut fraction: i64 = 0;
        for i in 0..CELL_PRECISION as usize {
            let digit = digits.get(i).map(|b| i64::from(b - b'0')).unwrap_or(0);
            fraction = fraction * 10 + digit;
        }
        let round_up = digits
            .get(CELL_PRECISION as usize)
            .map(|b| *b >= b'5')
            .unwrap_or(false);

        let magnitude = integer * CELL_SCALE + fraction + i64::from(round_up);
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

fn format_units(units: i64) -> String {
    let sign = if units < 0 { "-" } else { "" };
    let abs = units.unsigned_abs();
    let scale = CELL_SCALE as u64;
    format!(
        "{}{}.{:0width$}",
        sign,
        abs / scale,
        abs % scale,
        width = CELL_PRECISION as usize
    )
}

/// Territory classification of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryType {
    Land,
    Water,
    InternationalWaters,
    Antarctica,
    /// Every classification source failed; policy decides what to do.
    Unknown,
}

impl TerritoryType {
    /// Land and Antarctica can be claimed; open water never can.
    pub fn is_claimable(&self) -> bool {
        matches!(self, Self::Land | Self::Antarctica)
    }
}

impl fmt::Display for TerritoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Land => "land",
            Self::Water => "water",
            Self::InternationalWaters => "international_waters",
            Self::Antarctica => "antarctica",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Internal country code (upper-case ISO 3166-1 alpha-2 or a sentinel).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Sentinel for territory whose external identifier is not in the table.
    pub const UNCLASSIFIED: &'static str = "XX";
    /// Code used for everything south of the Antarctic heuristic line.
    pub const ANTARCTICA: &'static str = "AQ";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_ascii_uppercase())
    }

    pub fn unclassified() -> Self {
        Self(Self::UNCLASSIFIED.to_string())
    }

    pub fn antarctica() -> Self {
        Self(Self::ANTARCTICA.to_string())
    }

    pub fn is_unclassified(&self) -> bool {
        self.0 == Self::UNCLASSIFIED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of classifying a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub territory: TerritoryType,
    #[serde(rename = "countryCode", skip_serializing_if = "Option::is_none", default)]
    pub country: Option<CountryCode>,
}

impl Classification {
    pub fn land(country: CountryCode) -> Self {
        Self {
            territory: TerritoryType::Land,
            country: Some(country),
        }
    }

    pub fn antarctica() -> Self {
        Self {
            territory: TerritoryType::Antarctica,
            country: Some(CountryCode::antarctica()),
        }
    }

    pub fn water() -> Self {
        Self {
            territory: TerritoryType::Water,
            country: None,
        }
    }

    pub fn international_waters() -> Self {
        Self {
            territory: TerritoryType::InternationalWaters,
            country: None,
        }
    }

    pub fn unknown() -> Self {
        Self {
            territory: TerritoryType::Unknown,
            country: None,
        }
    }
}

// =============================================================================
// CLUSTER B: CANVAS
// =============================================================================

/// Current value of a paintable position. Each accepted write replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelValue {
    pub color: String,
    pub opacity: f32,
    pub owner_id: ActorId,
    pub timestamp: Timestamp,
}

// =============================================================================
// CLUSTER C: ACTIVITY
// =============================================================================

/// One accepted claim or paint in the activity log.
///
/// `tag` is the country code for cell claims and the color for paints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    /// Distinguishes entries that share timestamp, subject and actor.
    pub id: Uuid,
    pub timestamp: Timestamp,
    pub subject: String,
    pub actor_id: ActorId,
    pub tag: String,
}

impl TimelineEntry {
    pub fn new(
        timestamp: Timestamp,
        subject: impl Into<String>,
        actor_id: impl Into<ActorId>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            subject: subject.into(),
            actor_id: actor_id.into(),
            tag: tag.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_canonicalizes_precision() {
        let key = CellKey::parse("12.5,-45.25").unwrap();
        assert_eq!(key.as_str(), "12.5000,-45.2500");
    }

    #[test]
    fn test_equivalent_spellings_share_one_key() {
        let a = CellKey::parse("1.50000,2.0").unwrap();
        let b = CellKey::parse("01.5,2.00000000").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(CellKey::parse("1.00005,0.0").unwrap().as_str(), "1.0001,0.0000");
        assert_eq!(CellKey::parse("-1.00005,0.0").unwrap().as_str(), "-1.0001,0.0000");
        assert_eq!(CellKey::parse("1.00004,0.0").unwrap().as_str(), "1.0000,0.0000");
    }

    #[test]
    fn test_negative_zero_normalized() {
        let key = CellKey::parse("-0.00001,-0.0").unwrap();
        assert_eq!(key.as_str(), "0.0000,0.0000");
    }

    #[test]
    fn test_rejects_non_matching_shapes() {
        for raw in [
            "", "10,20", "10.0", "10.0,", ",10.0", "+1.0,2.0", "1.0, 2.0", " 1.0,2.0",
            "1.0,2.0,3.0", "1e3,2.0", "abc,def", "1.,2.0", ".5,2.0", "NaN,1.0", "1.0;2.0",
        ] {
            assert!(CellKey::parse(raw).is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            CellKey::parse("90.0001,0.0"),
            Err(CellKeyError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            CellKey::parse("0.0,-180.5"),
            Err(CellKeyError::LongitudeOutOfRange(_))
        ));
        assert!(CellKey::parse("90.0,180.0").is_ok());
        assert!(CellKey::parse("-90.0,-180.0").is_ok());
    }

    #[test]
    fn test_from_coordinate_matches_parse() {
        let from_coord = CellKey::from_coordinate(Coordinate::new(48.8566, 2.3522)).unwrap();
        let parsed = CellKey::parse("48.8566,2.3522").unwrap();
        assert_eq!(from_coord, parsed);
    }

    #[test]
    fn test_coordinate_roundtrip() {
        let key = CellKey::parse("-33.8688,151.2093").unwrap();
        let coord = key.coordinate();
        assert!((coord.lat + 33.8688).abs() < 1e-9);
        assert!((coord.lng - 151.2093).abs() < 1e-9);
    }

    #[test]
    fn test_grid_key_snaps_nearby_points() {
        let a = Coordinate::new(48.85661, 2.35222).grid_key(2);
        let b = Coordinate::new(48.8641, 2.3532).grid_key(2);
        assert_eq!(a, "48.86,2.35");
        assert_eq!(a, b);
        assert_eq!(Coordinate::new(-0.001, -0.001).grid_key(2), "0.00,0.00");
    }

    #[test]
    fn test_grid_key_splits_across_boundary() {
        let south = Coordinate::new(48.8549, 2.3501).grid_key(2);
        let north = Coordinate::new(48.8551, 2.3501).grid_key(2);
        assert_eq!(south, "48.85,2.35");
        assert_eq!(north, "48.86,2.35");
        assert_ne!(south, north);
    }

    #[test]
    fn test_classification_serialization() {
        let json = serde_json::to_value(Classification::land(CountryCode::new("fr"))).unwrap();
        assert_eq!(json["type"], "land");
        assert_eq!(json["countryCode"], "FR");

        let water = serde_json::to_value(Classification::water()).unwrap();
        assert!(water.get("countryCode").is_none());
    }

    #[test]
    fn test_claimable_territories() {
        assert!(TerritoryType::Land.is_claimable());
        assert!(TerritoryType::Antarctica.is_claimable());
        assert!(!TerritoryType::Water.is_claimable());
        assert!(!TerritoryType::InternationalWaters.is_claimable());
        assert!(!TerritoryType::Unknown.is_claimable());
    }

    proptest! {
        #[test]
        fn prop_in_range_decimals_accepted(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            let raw = format!("{:.6},{:.6}", lat, lng);
            let key = CellKey::parse(&raw).unwrap();
            // Canonical form re-parses to itself.
            prop_assert_eq!(CellKey::parse(key.as_str()).unwrap(), key);
        }

        #[test]
        fn prop_strings_without_decimal_point_rejected(s in "[-0-9,]{0,20}") {
            prop_assert!(CellKey::parse(&s).is_err());
        }

        #[test]
        fn prop_out_of_range_latitude_rejected(lat in 90.0001f64..1000.0, lng in -180.0f64..=180.0) {
            let raw = format!("{:.4},{:.4}", lat, lng);
            prop_assert!(CellKey::parse(&raw).is_err());
        }
    }
}
