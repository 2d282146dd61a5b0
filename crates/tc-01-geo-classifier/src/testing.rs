//! Test doubles for the classifier ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{CellKey, Classification, Coordinate};

use crate::domain::{GeocodeError, RawAddress};
use crate::ports::{ReverseGeocoder, TerritoryClassifier};

/// Reverse geocoder with a scripted answer that records how often it is asked.
pub struct CountingGeocoder {
    endpoint: String,
    response: Mutex<Option<RawAddress>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl CountingGeocoder {
    pub fn returning(endpoint: &str, address: RawAddress) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            response: Mutex::new(Some(address)),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every lookup fails with a network error.
    pub fn failing(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            response: Mutex::new(None),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the scripted answer; `None` makes later lookups fail.
    pub fn set_response(&self, address: Option<RawAddress>) {
        *self.response.lock() = address;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocoder for CountingGeocoder {
    async fn reverse_lookup(
        &self,
        _coord: Coordinate,
        _timeout: Duration,
    ) -> Result<RawAddress, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let response = self.response.lock().clone();
        response.ok_or_else(|| GeocodeError::Network {
            mirror: self.endpoint.clone(),
            reason: "scripted failure".into(),
        })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Classifier with fixed answers per cell and a fallback for everything else.
pub struct FixedClassifier {
    by_cell: HashMap<String, Classification>,
    fallback: Classification,
    calls: AtomicUsize,
}

impl FixedClassifier {
    /// Every coordinate gets `fallback`.
    pub fn always(fallback: Classification) -> Self {
        Self {
            by_cell: HashMap::new(),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    /// Override the answer for one cell.
    pub fn with_cell(mut self, cell: &CellKey, classification: Classification) -> Self {
        self.by_cell.insert(cell.as_str().to_string(), classification);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TerritoryClassifier for FixedClassifier {
    async fn classify(&self, coord: Coordinate) -> Classification {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CellKey::from_coordinate(coord)
            .ok()
            .and_then(|cell| self.by_cell.get(cell.as_str()).cloned())
            .unwrap_or_else(|| self.fallback.clone())
    }
}
