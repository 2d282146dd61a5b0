//! Nominatim-compatible reverse geocoder over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use shared_types::Coordinate;
use tracing::debug;

use crate::domain::{GeocodeError, RawAddress};
use crate::ports::ReverseGeocoder;

/// Zoom level 3 asks for country-level detail only.
const COUNTRY_ZOOM: u8 = 3;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<ReverseAddress>,
    /// Present instead of `address` when the point has no address (open sea).
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

pub struct NominatimGeocoder {
    base_url: String,
    http_client: reqwest::Client,
}

impl NominatimGeocoder {
    /// Mirrors reject requests without a user agent, so a client that cannot
    /// carry one is an error rather than a fallback.
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| GeocodeError::Client {
                mirror: base_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    fn reverse_url(&self) -> String {
        format!("{}/reverse", self.base_url)
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_lookup(
        &self,
        coord: Coordinate,
        timeout: Duration,
    ) -> Result<RawAddress, GeocodeError> {
        let response = self
            .http_client
            .get(self.reverse_url())
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coord.lat.to_string()),
                ("lon", coord.lng.to_string()),
                ("zoom", COUNTRY_ZOOM.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .header("Accept", "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodeError::Timeout {
                        mirror: self.base_url.clone(),
                        timeout_ms: timeout.as_millis() as u64,
                    }
                } else {
                    GeocodeError::Network {
                        mirror: self.base_url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(GeocodeError::Http {
                mirror: self.base_url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body: ReverseResponse =
            response
                .json()
                .await
                .map_err(|e| GeocodeError::Malformed {
                    mirror: self.base_url.clone(),
                    reason: e.to_string(),
                })?;

        Ok(into_raw_address(body))
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

fn into_raw_address(body: ReverseResponse) -> RawAddress {
    if let Some(reason) = body.error {
        debug!(reason = %reason, "geocoder has no address for point");
    }
    match body.address {
        Some(address) => RawAddress {
            country_code: address.country_code,
            country_name: address.country,
        },
        None => RawAddress::open_water(),
    }
}
