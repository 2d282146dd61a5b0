//! # Claim Ledger Service
//!
//! Write path for cells and pixels. Every accepted claim lands as one grouped
//! write so that the membership sets, the per-country and per-actor sets, the
//! counters and the timeline move together.
//!
//! ## Exactly-once
//!
//! Claimed-ness is checked before the write. Two requests for the same cell
//! that pass the check at the same moment can both write: the sets stay
//! correct (set adds are idempotent) but the counters over-count by one. The
//! batch path narrows this by counting only what it actually writes.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use shared_store::{keys, CommandReply, Pipeline, SharedStore};
use shared_types::{
    percentage, ActorId, CellKey, Classification, CountryCode, PixelValue, TerritoryType,
    TimeSource, TimelineEntry, Timestamp,
};
use tc_01_geo_classifier::{CountryTable, TerritoryClassifier};
use tc_03_batch_validation::PixelEntry;
use tc_05_timeline_index::TimelineIndex;
use tracing::{debug, error, info, warn};

use crate::domain::{
    BatchClaimResult, ClaimOutcome, ClaimResult, LedgerConfig, LedgerError, PaintResult,
};
use crate::ports::ClaimLedgerApi;

pub struct ClaimLedger {
    store: Arc<dyn SharedStore>,
    classifier: Arc<dyn TerritoryClassifier>,
    countries: Arc<CountryTable>,
    cell_timeline: Arc<TimelineIndex>,
    pixel_timeline: Arc<TimelineIndex>,
    clock: Arc<dyn TimeSource>,
    config: LedgerConfig,
}

impl ClaimLedger {
    pub fn new(
        store: Arc<dyn SharedStore>,
        classifier: Arc<dyn TerritoryClassifier>,
        countries: Arc<CountryTable>,
        cell_timeline: Arc<TimelineIndex>,
        pixel_timeline: Arc<TimelineIndex>,
        clock: Arc<dyn TimeSource>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            store,
            classifier,
            countries,
            cell_timeline,
            pixel_timeline,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Country a classification is credited to, or `None` when the territory
    /// cannot be claimed under the current policy.
    fn attribute(&self, classification: &Classification) -> Option<CountryCode> {
        match classification.territory {
            TerritoryType::Land => Some(
                classification
                    .country
                    .clone()
                    .unwrap_or_else(CountryCode::unclassified),
            ),
            TerritoryType::Antarctica => Some(
                classification
                    .country
                    .clone()
                    .unwrap_or_else(CountryCode::antarctica),
            ),
            TerritoryType::Unknown if self.config.accept_unknown_territory => {
                Some(CountryCode::unclassified())
            }
            TerritoryType::Unknown | TerritoryType::Water | TerritoryType::InternationalWaters => {
                None
            }
        }
    }

    /// Queue the per-cell part of a claim. Actor score and the global counter
    /// are added by the caller once per write.
    fn queue_cell(
        &self,
        pipeline: &mut Pipeline,
        cell: &CellKey,
        country: &CountryCode,
        actor_id: &str,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        pipeline.sadd(keys::CLAIMED_CELLS, cell.as_str());
        pipeline.sadd(keys::country_cells(country.as_str()), cell.as_str());
        pipeline.sadd(keys::CLAIMED_COUNTRIES, country.as_str());
        pipeline.sadd(keys::actor_cells(actor_id), cell.as_str());
        let entry = TimelineEntry::new(now, cell.as_str(), actor_id, country.as_str());
        self.cell_timeline.append_command(pipeline, &entry)?;
        Ok(())
    }

    /// Run a grouped write, logging the failure with its context.
    async fn write(
        &self,
        pipeline: Pipeline,
        operation: &'static str,
        actor_id: &str,
    ) -> Result<Vec<CommandReply>, LedgerError> {
        let commands = pipeline.len();
        self.store.execute(pipeline).await.map_err(|e| {
            terra_telemetry::STORE_ERRORS.inc();
            error!(operation, actor_id, commands, error = %e, "grouped write failed");
            LedgerError::from(e)
        })
    }

    /// Prune after a successful write. The write already happened, so a
    /// failure here is only logged.
    async fn prune(&self, timeline: &TimelineIndex, now: Timestamp) {
        if let Err(e) = timeline.prune_expired(now).await {
            warn!(key = timeline.key(), error = %e, "timeline prune failed");
        }
    }

    async fn online_actors_at(&self, now: Timestamp) -> Result<u64, LedgerError> {
        let mut actors: HashSet<ActorId> = self.cell_timeline.active_actors(now).await?;
        actors.extend(self.pixel_timeline.active_actors(now).await?);
        Ok((actors.len() as u64).max(1))
    }

    fn count(outcome: ClaimOutcome, n: usize) {
        if n > 0 {
            terra_telemetry::CLAIMS_TOTAL
                .with_label_values(&[outcome.as_str()])
                .inc_by(n as u64);
        }
    }
}

#[async_trait]
impl ClaimLedgerApi for ClaimLedger {
    async fn claim_cell(&self, cell: &CellKey, actor_id: &str) -> Result<ClaimResult, LedgerError> {
        if self.store.sismember(keys::CLAIMED_CELLS, cell.as_str()).await? {
            debug!(cell = %cell, actor_id, "cell already claimed");
            Self::count(ClaimOutcome::AlreadyClaimed, 1);
            return Ok(ClaimResult::already_claimed());
        }

        let classification = self.classifier.classify(cell.coordinate()).await;
        let Some(country) = self.attribute(&classification) else {
            debug!(cell = %cell, territory = ?classification.territory, "cell not claimable");
            Self::count(ClaimOutcome::Unclaimable, 1);
            return Ok(ClaimResult::unclaimable(classification.territory));
        };

        let now = self.clock.now_millis();
        let mut pipeline = Pipeline::new();
        self.queue_cell(&mut pipeline, cell, &country, actor_id, now)?;
        pipeline.hincr_by(keys::ACTOR_SCORES, actor_id, 1);
        pipeline.hincr_by(keys::TOTALS, keys::TOTAL_CLAIMED_FIELD, 1);
        self.write(pipeline, "claim_cell", actor_id).await?;
        Self::count(ClaimOutcome::Claimed, 1);

        let revealed = self
            .store
            .scard(&keys::country_cells(country.as_str()))
            .await?;
        let first_claim = revealed == 1;
        if first_claim {
            info!(country = %country, actor_id, "first claim in country");
        }
        self.prune(&self.cell_timeline, now).await;

        Ok(ClaimResult {
            outcome: ClaimOutcome::Claimed,
            percentage: Some(percentage(revealed, self.countries.total_cells(&country))),
            country: Some(country),
            territory: Some(classification.territory),
            first_claim: Some(first_claim),
        })
    }

    async fn claim_batch(
        &self,
        cells: &[CellKey],
        actor_id: &str,
    ) -> Result<BatchClaimResult, LedgerError> {
        let mut seen = HashSet::with_capacity(cells.len());
        let unique: Vec<&CellKey> = cells.iter().filter(|c| seen.insert(c.as_str())).collect();
        let mut result = BatchClaimResult {
            already_claimed: cells.len() - unique.len(),
            ..Default::default()
        };

        let members: Vec<String> = unique.iter().map(|c| c.as_str().to_string()).collect();
        let claimed = self.store.smismember(keys::CLAIMED_CELLS, &members).await?;
        let fresh: Vec<CellKey> = unique
            .into_iter()
            .zip(claimed)
            .filter_map(|(cell, is_claimed)| (!is_claimed).then(|| cell.clone()))
            .collect();
        result.already_claimed += members.len() - fresh.len();

        let classified: Vec<(CellKey, Classification)> = stream::iter(fresh)
            .map(|cell| {
                let classifier = Arc::clone(&self.classifier);
                async move {
                    let classification = classifier.classify(cell.coordinate()).await;
                    (cell, classification)
                }
            })
            .buffered(self.config.batch_classify_concurrency)
            .collect()
            .await;

        let now = self.clock.now_millis();
        let mut pipeline = Pipeline::new();
        for (cell, classification) in &classified {
            match self.attribute(classification) {
                Some(country) => {
                    self.queue_cell(&mut pipeline, cell, &country, actor_id, now)?;
                    result.processed += 1;
                }
                None => result.unclaimable += 1,
            }
        }
        Self::count(ClaimOutcome::AlreadyClaimed, result.already_claimed);
        Self::count(ClaimOutcome::Unclaimable, result.unclaimable);

        if result.processed == 0 {
            debug!(actor_id, submitted = cells.len(), "batch had nothing to claim");
            result.total_after = read_counter(&*self.store, keys::TOTAL_CLAIMED_FIELD).await?;
            result.online_actors = self.online_actors_at(now).await?;
            return Ok(result);
        }

        let delta = result.processed as i64;
        pipeline.hincr_by(keys::ACTOR_SCORES, actor_id, delta);
        let total_idx = pipeline.hincr_by(keys::TOTALS, keys::TOTAL_CLAIMED_FIELD, delta);
        let replies = self.write(pipeline, "claim_batch", actor_id).await?;
        Self::count(ClaimOutcome::Claimed, result.processed);

        result.total_after = counter_reply(&replies, total_idx);
        self.prune(&self.cell_timeline, now).await;
        result.online_actors = self.online_actors_at(now).await?;

        debug!(
            actor_id,
            processed = result.processed,
            already_claimed = result.already_claimed,
            unclaimable = result.unclaimable,
            "batch claimed"
        );
        Ok(result)
    }

    async fn paint_batch(
        &self,
        pixels: &[PixelEntry],
        actor_id: &str,
    ) -> Result<PaintResult, LedgerError> {
        let now = self.clock.now_millis();
        let mut pipeline = Pipeline::new();

        for pixel in pixels {
            let value = PixelValue {
                color: pixel.color.clone(),
                opacity: pixel.opacity,
                owner_id: actor_id.to_string(),
                timestamp: now,
            };
            let raw = serde_json::to_string(&value).map_err(|e| LedgerError::Encode {
                what: "pixel value",
                reason: e.to_string(),
            })?;
            pipeline.hset(keys::PIXELS, pixel.position.as_str(), raw);
            pipeline.hincr_by(keys::PIXEL_COLORS, pixel.color.as_str(), 1);
            let entry = TimelineEntry::new(now, pixel.position.as_str(), actor_id, pixel.color.as_str());
            self.pixel_timeline.append_command(&mut pipeline, &entry)?;
        }

        if pixels.is_empty() {
            return Ok(PaintResult {
                processed: 0,
                total_pixels: read_counter(&*self.store, keys::TOTAL_PIXELS_FIELD).await?,
                online_actors: self.online_actors_at(now).await?,
            });
        }

        let delta = pixels.len() as i64;
        pipeline.hincr_by(keys::ACTOR_PIXELS, actor_id, delta);
        let total_idx = pipeline.hincr_by(keys::TOTALS, keys::TOTAL_PIXELS_FIELD, delta);
        let replies = self.write(pipeline, "paint_batch", actor_id).await?;
        terra_telemetry::PIXELS_PAINTED.inc_by(pixels.len() as u64);

        self.prune(&self.pixel_timeline, now).await;
        debug!(actor_id, processed = pixels.len(), "pixels painted");

        Ok(PaintResult {
            processed: pixels.len(),
            total_pixels: counter_reply(&replies, total_idx),
            online_actors: self.online_actors_at(now).await?,
        })
    }

    async fn pixel(&self, position: &str) -> Result<Option<PixelValue>, LedgerError> {
        let Some(raw) = self.store.hget(keys::PIXELS, position).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(position, error = %e, "unreadable pixel value");
                Ok(None)
            }
        }
    }

    async fn online_actors(&self) -> Result<u64, LedgerError> {
        self.online_actors_at(self.clock.now_millis()).await
    }
}

/// Global counter from the totals hash; missing reads as zero.
async fn read_counter(store: &dyn SharedStore, field: &str) -> Result<u64, LedgerError> {
    Ok(store
        .hget(keys::TOTALS, field)
        .await?
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(0))
}

fn counter_reply(replies: &[CommandReply], index: usize) -> u64 {
    replies
        .get(index)
        .and_then(CommandReply::as_int)
        .map_or(0, |n| n.max(0) as u64)
}
