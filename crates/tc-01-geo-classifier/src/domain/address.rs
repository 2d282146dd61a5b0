//! Interpreting a reverse-geocoder record.

use serde::{Deserialize, Serialize};
use shared_types::{Classification, CountryCode};

use super::countries::CountryTable;

/// The parts of a reverse-geocoder answer the classifier uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAddress {
    /// Lowercase ISO 3166-1 alpha-2, absent over open water.
    pub country_code: Option<String>,
    pub country_name: Option<String>,
}

impl RawAddress {
    pub fn in_country(code: &str) -> Self {
        Self {
            country_code: Some(code.to_string()),
            country_name: None,
        }
    }

    pub fn open_water() -> Self {
        Self::default()
    }

    /// Map onto a classification. An address without a country is water.
    pub fn classify(&self, table: &CountryTable) -> Classification {
        match self.country_code.as_deref().map(str::trim) {
            Some(code) if code.eq_ignore_ascii_case(CountryCode::ANTARCTICA) => {
                Classification::antarctica()
            }
            Some(code) if !code.is_empty() => Classification::land(table.resolve(code)),
            _ => Classification::water(),
        }
    }
}
