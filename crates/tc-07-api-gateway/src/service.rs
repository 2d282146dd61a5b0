//! # Claim Service
//!
//! Request pipeline for writes: validate, then admit, then apply. A request
//! that fails validation never consumes rate budget; a request that is
//! rate-limited never reaches the store.
//!
//! Reads go straight to the aggregation service and are not rate-limited.

use std::sync::Arc;

use shared_types::PixelValue;
use tc_01_geo_classifier::CountryTable;
use tc_02_rate_limiter::AdmissionControl;
use tc_03_batch_validation::{BatchValidator, ValidationError};
use tc_04_claim_ledger::ClaimLedgerApi;
use tc_06_aggregation::{
    ActorStats, AggregationError, AggregationService, CountryStat, LeaderboardView, WorldState,
};
use tracing::{debug, error};

use crate::domain::{
    ApiError, BatchClaimRequest, BatchClaimResponse, ClaimRequest, ClaimResponse,
    PaintBatchRequest, PaintBatchResponse,
};

pub struct ClaimService {
    validator: BatchValidator,
    limiter: Arc<dyn AdmissionControl>,
    ledger: Arc<dyn ClaimLedgerApi>,
    aggregation: Arc<AggregationService>,
    countries: Arc<CountryTable>,
    expose_error_detail: bool,
}

impl ClaimService {
    pub fn new(
        validator: BatchValidator,
        limiter: Arc<dyn AdmissionControl>,
        ledger: Arc<dyn ClaimLedgerApi>,
        aggregation: Arc<AggregationService>,
        countries: Arc<CountryTable>,
        expose_error_detail: bool,
    ) -> Self {
        Self {
            validator,
            limiter,
            ledger,
            aggregation,
            countries,
            expose_error_detail,
        }
    }

    async fn admit(&self, client_key: &str) -> Result<(), ApiError> {
        let admission = self.limiter.admit(client_key).await;
        match admission.retry_after_ms {
            Some(retry_after_ms) if !admission.allowed => {
                terra_telemetry::RATE_LIMITED.inc();
                Err(ApiError::rate_limited(retry_after_ms))
            }
            _ => Ok(()),
        }
    }

    fn read_error(&self, err: AggregationError) -> ApiError {
        error!(error = %err, "aggregate read failed");
        terra_telemetry::STORE_ERRORS.inc();
        ApiError::from_aggregation(err, self.expose_error_detail)
    }

    pub async fn claim(
        &self,
        client_key: &str,
        request: ClaimRequest,
    ) -> Result<ClaimResponse, ApiError> {
        let cell = self.validator.validate_cell_key(&request.cell_key)?;
        let actor_id = self.validator.validate_actor_id(&request.actor_id)?;
        self.admit(client_key).await?;

        let result = self
            .ledger
            .claim_cell(&cell, &actor_id)
            .await
            .map_err(|e| ApiError::from_ledger(e, self.expose_error_detail))?;
        Ok(ClaimResponse::from_result(result, &self.countries))
    }

    pub async fn claim_batch(
        &self,
        client_key: &str,
        request: BatchClaimRequest,
    ) -> Result<BatchClaimResponse, ApiError> {
        let validated = self.validator.validate_cells(&request.cells)?;
        let actor_id = self.validator.validate_actor_id(&request.actor_id)?;
        self.admit(client_key).await?;

        if validated.rejected_count > 0 {
            terra_telemetry::BATCH_ENTRIES_REJECTED.inc_by(validated.rejected_count as u64);
        }
        let result = self
            .ledger
            .claim_batch(&validated.accepted, &actor_id)
            .await
            .map_err(|e| ApiError::from_ledger(e, self.expose_error_detail))?;
        debug!(
            client_key,
            processed = result.processed,
            rejected = validated.rejected_count,
            "cell batch applied"
        );

        Ok(BatchClaimResponse {
            success: true,
            processed: result.processed,
            rejected: validated.rejected_count,
            total_claimed: result.total_after,
            online_actors: result.online_actors,
        })
    }

    pub async fn paint_batch(
        &self,
        client_key: &str,
        request: PaintBatchRequest,
    ) -> Result<PaintBatchResponse, ApiError> {
        let validated = self.validator.validate_pixels(&request.pixels)?;
        let actor_id = self.validator.validate_actor_id(&request.actor_id)?;
        self.admit(client_key).await?;

        if validated.rejected_count > 0 {
            terra_telemetry::BATCH_ENTRIES_REJECTED.inc_by(validated.rejected_count as u64);
        }
        let result = self
            .ledger
            .paint_batch(&validated.accepted, &actor_id)
            .await
            .map_err(|e| ApiError::from_ledger(e, self.expose_error_detail))?;

        Ok(PaintBatchResponse {
            success: true,
            processed: result.processed,
            rejected: validated.rejected_count,
            total_pixels: result.total_pixels,
            online_actors: result.online_actors,
        })
    }

    pub async fn pixel(&self, position: &str) -> Result<PixelValue, ApiError> {
        self.ledger
            .pixel(position)
            .await
            .map_err(|e| ApiError::from_ledger(e, self.expose_error_detail))?
            .ok_or_else(|| ApiError::not_found(format!("pixel {position}")))
    }

    pub async fn leaderboard(&self) -> Result<LeaderboardView, ApiError> {
        self.aggregation
            .leaderboard_view()
            .await
            .map_err(|e| self.read_error(e))
    }

    pub async fn world(&self) -> Result<WorldState, ApiError> {
        self.aggregation
            .world_state()
            .await
            .map_err(|e| self.read_error(e))
    }

    pub async fn actor(&self, actor_id: &str) -> Result<ActorStats, ApiError> {
        let actor_id = self.validator.validate_actor_id(actor_id)?;
        self.aggregation
            .actor_stats(&actor_id)
            .await
            .map_err(|e| self.read_error(e))
    }

    pub async fn country(&self, code: &str) -> Result<CountryStat, ApiError> {
        let code = code.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ApiError::validation(&ValidationError::InvalidField {
                field: "code",
                reason: "must be a two-letter country code".into(),
            }));
        }
        self.aggregation
            .country_detail(code)
            .await
            .map_err(|e| self.read_error(e))
    }
}
