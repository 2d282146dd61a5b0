//! Prometheus metrics for TerraClaim.
//!
//! All metrics follow the naming convention: `tc_<subject>_<unit>`.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CLAIMS
    // =========================================================================

    /// Cell claim attempts by outcome (claimed, already_claimed, unclaimable)
    pub static ref CLAIMS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("tc_claims_total", "Cell claim attempts by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Pixels written by paint batches
    pub static ref PIXELS_PAINTED: IntCounter = IntCounter::new(
        "tc_pixels_painted_total",
        "Total pixels written"
    ).expect("metric creation failed");

    /// Batch entries dropped by per-entry validation
    pub static ref BATCH_ENTRIES_REJECTED: IntCounter = IntCounter::new(
        "tc_batch_entries_rejected_total",
        "Batch entries dropped by per-entry validation"
    ).expect("metric creation failed");

    // =========================================================================
    // ADMISSION
    // =========================================================================

    /// Requests denied by the rate limiter
    pub static ref RATE_LIMITED: IntCounter = IntCounter::new(
        "tc_rate_limited_total",
        "Requests denied by the rate limiter"
    ).expect("metric creation failed");

    // =========================================================================
    // GEO CLASSIFICATION
    // =========================================================================

    /// Reverse-geocoder attempts by result (ok, error, timeout)
    pub static ref GEOCODER_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("tc_geocoder_requests_total", "Reverse-geocoder attempts by result"),
        &["result"]
    ).expect("metric creation failed");

    /// Classifications answered from the grid cache
    pub static ref GEO_CACHE_HITS: IntCounter = IntCounter::new(
        "tc_geo_cache_hits_total",
        "Classifications served from the grid cache"
    ).expect("metric creation failed");

    // =========================================================================
    // STORE & HTTP
    // =========================================================================

    /// Requests that failed on a shared-store error
    pub static ref STORE_ERRORS: IntCounter = IntCounter::new(
        "tc_store_errors_total",
        "Requests failed by a shared-store error"
    ).expect("metric creation failed");

    /// Request latency per route
    pub static ref REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "tc_request_duration_seconds",
            "Time spent handling API requests"
        ).buckets(exponential_buckets(0.0005, 2.0, 14).expect("valid buckets")),
        &["route"]
    ).expect("metric creation failed");
}

/// Register every metric with [`REGISTRY`]. Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(CLAIMS_TOTAL.clone()),
        Box::new(PIXELS_PAINTED.clone()),
        Box::new(BATCH_ENTRIES_REJECTED.clone()),
        Box::new(RATE_LIMITED.clone()),
        Box::new(GEOCODER_REQUESTS.clone()),
        Box::new(GEO_CACHE_HITS.clone()),
        Box::new(STORE_ERRORS.clone()),
        Box::new(REQUEST_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Observes elapsed seconds into a labelled histogram on drop.
pub struct RequestTimer {
    route: &'static str,
    start: std::time::Instant,
}

impl RequestTimer {
    pub fn new(route: &'static str) -> Self {
        Self {
            route,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        REQUEST_DURATION
            .with_label_values(&[self.route])
            .observe(self.start.elapsed().as_secs_f64());
    }
}
