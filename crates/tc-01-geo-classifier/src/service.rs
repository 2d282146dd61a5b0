//! # Geo Classifier Service
//!
//! Resolution order for one coordinate:
//!
//! 1. Local heuristics (polar caps, open ocean). No I/O.
//! 2. Grid cache in the shared store.
//! 3. Reverse-geocoder mirrors, round-robin, each attempt time-bounded.
//!
//! Lookups that reach a mirror are cached for `cache_ttl`. When every attempt
//! fails the answer is `Unknown` and nothing is cached, so the next request
//! for that grid square tries again.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use shared_store::{keys, SharedStore};
use shared_types::{Classification, Coordinate};
use tracing::{debug, warn};

use crate::domain::{classify_locally, CountryTable, GeoClassifierConfig, GeocodeError};
use crate::ports::{ReverseGeocoder, TerritoryClassifier};

/// Counters for how classifications were answered.
#[derive(Debug, Default)]
struct GeoCounters {
    heuristic_hits: AtomicU64,
    cache_hits: AtomicU64,
    lookups: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of the classifier counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoStats {
    pub heuristic_hits: u64,
    pub cache_hits: u64,
    /// Classifications answered by a mirror.
    pub lookups: u64,
    /// Classifications where every attempt failed.
    pub failures: u64,
}

pub struct GeoClassifier {
    config: GeoClassifierConfig,
    mirrors: Vec<Arc<dyn ReverseGeocoder>>,
    store: Arc<dyn SharedStore>,
    countries: Arc<CountryTable>,
    next_mirror: AtomicUsize,
    counters: GeoCounters,
}

impl GeoClassifier {
    pub fn new(
        config: GeoClassifierConfig,
        mirrors: Vec<Arc<dyn ReverseGeocoder>>,
        store: Arc<dyn SharedStore>,
        countries: Arc<CountryTable>,
    ) -> Self {
        Self {
            config,
            mirrors,
            store,
            countries,
            next_mirror: AtomicUsize::new(0),
            counters: GeoCounters::default(),
        }
    }

    pub fn stats(&self) -> GeoStats {
        GeoStats {
            heuristic_hits: self.counters.heuristic_hits.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            lookups: self.counters.lookups.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    pub fn countries(&self) -> &CountryTable {
        &self.countries
    }

    fn cache_key(&self, coord: &Coordinate) -> String {
        keys::geo_cache(&coord.grid_key(self.config.grid_precision))
    }

    async fn cached(&self, key: &str) -> Option<Classification> {
        match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(classification) => Some(classification),
                Err(e) => {
                    warn!(key, error = %e, "discarding unreadable geo cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "geo cache read failed, treating as miss");
                None
            }
        }
    }

    async fn remember(&self, key: &str, classification: &Classification) {
        let raw = match serde_json::to_string(classification) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "could not encode classification for cache");
                return;
            }
        };
        if let Err(e) = self.store.set_ex(key, &raw, self.config.cache_ttl).await {
            warn!(key, error = %e, "geo cache write failed");
        }
    }

    /// Try mirrors round-robin until one answers or the attempt budget is spent.
    async fn lookup(&self, coord: Coordinate) -> Result<Classification, GeocodeError> {
        if self.mirrors.is_empty() {
            return Err(GeocodeError::NoMirrors);
        }

        let start = self.next_mirror.fetch_add(1, Ordering::Relaxed);
        let timeout = self.config.attempt_timeout;
        let mut last_error = GeocodeError::NoMirrors;

        for attempt in 0..self.config.attempts() {
            let mirror = &self.mirrors[(start + attempt) % self.mirrors.len()];
            let result = match tokio::time::timeout(timeout, mirror.reverse_lookup(coord, timeout)).await {
                Ok(result) => result,
                Err(_) => Err(GeocodeError::Timeout {
                    mirror: mirror.endpoint().to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                }),
            };

            match result {
                Ok(address) => {
                    terra_telemetry::GEOCODER_REQUESTS
                        .with_label_values(&["ok"])
                        .inc();
                    return Ok(address.classify(&self.countries));
                }
                Err(e) => {
                    terra_telemetry::GEOCODER_REQUESTS
                        .with_label_values(&[e.metric_label()])
                        .inc();
                    debug!(mirror = mirror.endpoint(), attempt, error = %e, "geocoder attempt failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl TerritoryClassifier for GeoClassifier {
    async fn classify(&self, coord: Coordinate) -> Classification {
        if let Some(classification) = classify_locally(&coord) {
            self.counters.heuristic_hits.fetch_add(1, Ordering::Relaxed);
            return classification;
        }

        let key = self.cache_key(&coord);
        if let Some(classification) = self.cached(&key).await {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            terra_telemetry::GEO_CACHE_HITS.inc();
            return classification;
        }

        match self.lookup(coord).await {
            Ok(classification) => {
                self.counters.lookups.fetch_add(1, Ordering::Relaxed);
                self.remember(&key, &classification).await;
                classification
            }
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                warn!(lat = coord.lat, lng = coord.lng, error = %e, "classification unavailable");
                Classification::unknown()
            }
        }
    }
}
