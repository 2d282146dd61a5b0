//! Country reference data.
//!
//! Maps the reverse geocoder's lowercase ISO 3166-1 alpha-2 identifiers onto
//! internal `CountryCode`s and carries the display name and the per-country
//! cell denominator used for completion percentages. Denominators are
//! reference data, not derived: deployments override them by config.

use std::collections::HashMap;

use serde::Serialize;
use shared_types::CountryCode;

/// Denominator for codes with no table entry and no override.
pub const DEFAULT_TOTAL_CELLS: u64 = 10_000;

/// (code, name, total cells). One cell is roughly 100 km² of land.
const BUILTIN: &[(&str, &str, u64)] = &[
    ("AQ", "Antarctica", 140_000),
    ("AR", "Argentina", 27_804),
    ("AU", "Australia", 76_920),
    ("BR", "Brazil", 85_158),
    ("CA", "Canada", 99_849),
    ("CH", "Switzerland", 413),
    ("CL", "Chile", 7_562),
    ("CN", "China", 95_970),
    ("CO", "Colombia", 11_418),
    ("DE", "Germany", 3_574),
    ("DZ", "Algeria", 23_817),
    ("EG", "Egypt", 10_014),
    ("ES", "Spain", 5_060),
    ("FI", "Finland", 3_381),
    ("FR", "France", 5_437),
    ("GB", "United Kingdom", 2_425),
    ("GR", "Greece", 1_320),
    ("ID", "Indonesia", 19_046),
    ("IN", "India", 32_873),
    ("IS", "Iceland", 1_030),
    ("IT", "Italy", 3_013),
    ("JP", "Japan", 3_779),
    ("KE", "Kenya", 5_804),
    ("KR", "South Korea", 1_004),
    ("KZ", "Kazakhstan", 27_249),
    ("MX", "Mexico", 19_644),
    ("NG", "Nigeria", 9_238),
    ("NL", "Netherlands", 415),
    ("NO", "Norway", 3_852),
    ("NZ", "New Zealand", 2_680),
    ("PE", "Peru", 12_852),
    ("PL", "Poland", 3_127),
    ("PT", "Portugal", 922),
    ("RU", "Russia", 170_982),
    ("SA", "Saudi Arabia", 21_500),
    ("SE", "Sweden", 4_503),
    ("TR", "Turkey", 7_836),
    ("UA", "Ukraine", 6_036),
    ("US", "United States", 98_335),
    ("ZA", "South Africa", 12_211),
];

/// Display and denominator data for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryInfo {
    pub code: CountryCode,
    pub name: String,
    pub flag: String,
    pub total_cells: u64,
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    total_cells: u64,
}

/// Lookup table from external identifiers to internal codes.
#[derive(Debug, Clone)]
pub struct CountryTable {
    entries: HashMap<String, Entry>,
}

impl Default for CountryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CountryTable {
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(code, name, total)| {
                (
                    code.to_string(),
                    Entry {
                        name: name.to_string(),
                        total_cells: *total,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Replace denominators. Codes not yet in the table are added with the
    /// code as their name.
    pub fn with_overrides(mut self, overrides: &HashMap<String, u64>) -> Self {
        for (code, total) in overrides {
            let code = code.to_ascii_uppercase();
            self.entries
                .entry(code.clone())
                .and_modify(|e| e.total_cells = *total)
                .or_insert(Entry {
                    name: code,
                    total_cells: *total,
                });
        }
        self
    }

    /// Internal code for an external identifier. Unknown identifiers map to
    /// the unclassified sentinel.
    pub fn resolve(&self, external: &str) -> CountryCode {
        let upper = external.trim().to_ascii_uppercase();
        if self.entries.contains_key(&upper) {
            CountryCode::new(upper)
        } else {
            CountryCode::unclassified()
        }
    }

    pub fn total_cells(&self, code: &CountryCode) -> u64 {
        self.entries
            .get(code.as_str())
            .map_or(DEFAULT_TOTAL_CELLS, |e| e.total_cells)
    }

    pub fn info(&self, code: &CountryCode) -> CountryInfo {
        let name = match self.entries.get(code.as_str()) {
            Some(entry) => entry.name.clone(),
            None if code.is_unclassified() => "Unclassified".to_string(),
            None => code.as_str().to_string(),
        };
        CountryInfo {
            code: code.clone(),
            name,
            flag: flag_emoji(code),
            total_cells: self.total_cells(code),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Regional-indicator flag for a two-letter code; a white flag otherwise.
pub fn flag_emoji(code: &CountryCode) -> String {
    let bytes = code.as_str().as_bytes();
    let is_letter_pair = bytes.len() == 2 && bytes.iter().all(u8::is_ascii_uppercase);
    if !is_letter_pair || code.is_unclassified() {
        return "\u{1F3F3}\u{FE0F}".to_string();
    }
    bytes
        .iter()
        .filter_map(|b| char::from_u32(0x1F1E6 + u32::from(b - b'A')))
        .collect()
}
