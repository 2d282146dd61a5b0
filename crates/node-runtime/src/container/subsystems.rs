//! # Subsystem Container
//!
//! Builds every subsystem once and hands out shared handles.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: Shared store (bounded), country table, clock
//! Level 1: Geo classifier, timelines, rate limiter
//! Level 2: Claim ledger, aggregation
//! Level 3: Claim service (gateway pipeline)
//! ```
//!
//! Subsystems never hold a reference to the container; each receives only
//! the handles it needs.

use std::sync::Arc;

use shared_store::{BoundedStore, InMemoryStore, SharedStore};
use shared_types::{SystemTimeSource, TimeSource};
use tc_01_geo_classifier::{
    CountryTable, GeoClassifier, GeocodeError, NominatimGeocoder, ReverseGeocoder,
};
use tc_02_rate_limiter::{AdmissionControl, FixedWindowLimiter, StoreWindowLimiter};
use tc_03_batch_validation::BatchValidator;
use tc_04_claim_ledger::ClaimLedger;
use tc_05_timeline_index::TimelineIndex;
use tc_06_aggregation::AggregationService;
use tc_07_api_gateway::ClaimService;
use tracing::{info, instrument};

use crate::container::config::NodeConfig;

pub struct SubsystemContainer {
    pub config: NodeConfig,
    pub clock: Arc<dyn TimeSource>,
    /// Bounded view of the shared store; every subsystem goes through it.
    pub store: Arc<dyn SharedStore>,
    pub countries: Arc<CountryTable>,
    pub classifier: Arc<GeoClassifier>,
    pub cell_timeline: Arc<TimelineIndex>,
    pub pixel_timeline: Arc<TimelineIndex>,
    pub limiter: Arc<dyn AdmissionControl>,
    pub ledger: Arc<ClaimLedger>,
    pub aggregation: Arc<AggregationService>,
    pub claim_service: Arc<ClaimService>,
}

impl SubsystemContainer {
    /// Production wiring: in-process store, wall clock, one Nominatim
    /// adapter per configured mirror.
    pub fn new(config: NodeConfig) -> Result<Self, GeocodeError> {
        let clock: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
        let backing: Arc<dyn SharedStore> = Arc::new(InMemoryStore::with_clock(clock.clone()));
        let mirrors = config
            .geo
            .mirrors
            .iter()
            .map(|url| {
                let geocoder = NominatimGeocoder::new(
                    url.clone(),
                    &config.geo.user_agent,
                    config.geo.attempt_timeout,
                )?;
                Ok(Arc::new(geocoder) as Arc<dyn ReverseGeocoder>)
            })
            .collect::<Result<Vec<_>, GeocodeError>>()?;
        Ok(Self::with_parts(config, backing, mirrors, clock))
    }

    /// Wire the subsystems over the given store, geocoder mirrors and clock.
    #[instrument(skip_all, fields(mirrors = mirrors.len()))]
    pub fn with_parts(
        config: NodeConfig,
        backing: Arc<dyn SharedStore>,
        mirrors: Vec<Arc<dyn ReverseGeocoder>>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        // Level 0
        let store: Arc<dyn SharedStore> =
            Arc::new(BoundedStore::new(backing, config.store.clone()));
        let countries = Arc::new(
            CountryTable::builtin().with_overrides(&config.aggregation.country_totals),
        );

        // Level 1
        let classifier = Arc::new(GeoClassifier::new(
            config.geo.clone(),
            mirrors,
            store.clone(),
            countries.clone(),
        ));
        let cell_timeline = Arc::new(TimelineIndex::cells(store.clone(), config.timeline.clone()));
        let pixel_timeline =
            Arc::new(TimelineIndex::pixels(store.clone(), config.timeline.clone()));
        let limiter: Arc<dyn AdmissionControl> = if config.shared_rate_limit {
            Arc::new(StoreWindowLimiter::new(
                config.rate_limit.clone(),
                store.clone(),
                clock.clone(),
            ))
        } else {
            Arc::new(FixedWindowLimiter::new(config.rate_limit.clone(), clock.clone()))
        };

        // Level 2
        let ledger = Arc::new(ClaimLedger::new(
            store.clone(),
            classifier.clone(),
            countries.clone(),
            cell_timeline.clone(),
            pixel_timeline.clone(),
            clock.clone(),
            config.ledger.clone(),
        ));
        let aggregation = Arc::new(AggregationService::new(
            store.clone(),
            countries.clone(),
            cell_timeline.clone(),
            clock.clone(),
            config.aggregation.clone(),
        ));

        // Level 3
        let claim_service = Arc::new(ClaimService::new(
            BatchValidator::new(config.validation.clone()),
            limiter.clone(),
            ledger.clone(),
            aggregation.clone(),
            countries.clone(),
            config.gateway.expose_error_detail,
        ));

        info!(
            countries = countries.len(),
            shared_rate_limit = config.shared_rate_limit,
            "subsystems initialized"
        );

        Self {
            config,
            clock,
            store,
            countries,
            classifier,
            cell_timeline,
            pixel_timeline,
            limiter,
            ledger,
            aggregation,
            claim_service,
        }
    }
}
