//! # Aggregation Service
//!
//! Read-only views over ledger state. Aggregates that change slowly
//! (leaderboard, country percentages, world totals) are cached for
//! `cache_ttl`; recent activity and per-actor reads are always fresh.
//!
//! Country counts come from set cardinality, never from a separate counter.

use std::cmp::Ordering;
use std::sync::Arc;

use shared_store::{keys, SharedStore};
use shared_types::{percentage, CountryCode, TimeSource};
use tc_01_geo_classifier::CountryTable;
use tc_05_timeline_index::TimelineIndex;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::domain::{
    display_handle, ActivityItem, ActorStats, AggregationConfig, AggregationError, CountryStat,
    LeaderboardEntry, LeaderboardView, WorldState, WorldTotals,
};

pub struct AggregationService {
    store: Arc<dyn SharedStore>,
    countries: Arc<CountryTable>,
    cell_timeline: Arc<TimelineIndex>,
    clock: Arc<dyn TimeSource>,
    config: AggregationConfig,
    leaderboard_cache: TtlCache<usize, Vec<LeaderboardEntry>>,
    country_cache: TtlCache<usize, Vec<CountryStat>>,
    totals_cache: TtlCache<(), WorldTotals>,
}

impl AggregationService {
    pub fn new(
        store: Arc<dyn SharedStore>,
        countries: Arc<CountryTable>,
        cell_timeline: Arc<TimelineIndex>,
        clock: Arc<dyn TimeSource>,
        config: AggregationConfig,
    ) -> Self {
        let ttl = config.cache_ttl_ms();
        Self {
            store,
            countries,
            cell_timeline,
            leaderboard_cache: TtlCache::new(ttl, clock.clone()),
            country_cache: TtlCache::new(ttl, clock.clone()),
            totals_cache: TtlCache::new(ttl, clock.clone()),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Top actors by score; ties go to the lower actor id.
    pub async fn leaderboard(&self, top_k: usize) -> Result<Vec<LeaderboardEntry>, AggregationError> {
        if let Some(cached) = self.leaderboard_cache.get(&top_k) {
            return Ok(cached);
        }
        let mut ranked = self.ranked_actors().await?;
        ranked.truncate(top_k);
        let entries: Vec<LeaderboardEntry> = ranked
            .into_iter()
            .enumerate()
            .map(|(i, (actor_id, score))| LeaderboardEntry {
                rank: i + 1,
                handle: display_handle(&actor_id),
                score,
                actor_id,
            })
            .collect();
        self.leaderboard_cache.insert(top_k, entries.clone());
        Ok(entries)
    }

    /// Countries with at least one claimed cell, highest completion first;
    /// ties go to the lower code.
    pub async fn country_stats(&self, top_k: usize) -> Result<Vec<CountryStat>, AggregationError> {
        if let Some(cached) = self.country_cache.get(&top_k) {
            return Ok(cached);
        }
        let codes = self.store.smembers(keys::CLAIMED_COUNTRIES, None).await?;
        let mut stats = Vec::with_capacity(codes.len());
        for code in codes {
            let stat = self.country_stat(CountryCode::new(code)).await?;
            if stat.revealed_count > 0 {
                stats.push(stat);
            }
        }
        stats.sort_by(|a, b| {
            b.percentage
                .partial_cmp(&a.percentage)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.code.as_str().cmp(b.code.as_str()))
        });
        stats.truncate(top_k);
        self.country_cache.insert(top_k, stats.clone());
        Ok(stats)
    }

    /// Latest claims in display form. Entries past retention are visible
    /// until the next write prunes them.
    pub async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityItem>, AggregationError> {
        let now = self.clock.now_millis();
        let entries = self.cell_timeline.recent(now, limit).await?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let info = self.countries.info(&CountryCode::new(entry.tag));
                ActivityItem {
                    timestamp: entry.timestamp,
                    handle: display_handle(&entry.actor_id),
                    cell: entry.subject,
                    country: info.code,
                    country_name: info.name,
                    flag: info.flag,
                }
            })
            .collect())
    }

    pub async fn world_totals(&self) -> Result<WorldTotals, AggregationError> {
        if let Some(cached) = self.totals_cache.get(&()) {
            return Ok(cached);
        }
        let total_claimed = self.store.scard(keys::CLAIMED_CELLS).await?;
        let countries_claimed = self.store.scard(keys::CLAIMED_COUNTRIES).await?;
        let total_pixels = self
            .store
            .hget(keys::TOTALS, keys::TOTAL_PIXELS_FIELD)
            .await?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        let totals = WorldTotals {
            total_claimed,
            total_pixels,
            countries_claimed,
            world_percentage: percentage(total_claimed, self.config.world_total_cells),
        };
        self.totals_cache.insert((), totals);
        Ok(totals)
    }

    /// Countries, actors and recent activity in one read.
    pub async fn leaderboard_view(&self) -> Result<LeaderboardView, AggregationError> {
        Ok(LeaderboardView {
            countries: self.country_stats(self.config.country_stats_size).await?,
            actors: self.leaderboard(self.config.leaderboard_size).await?,
            recent_activity: self.recent_activity(self.config.recent_activity_limit).await?,
        })
    }

    pub async fn world_state(&self) -> Result<WorldState, AggregationError> {
        let claimed_cells = self
            .store
            .smembers(keys::CLAIMED_CELLS, Some(self.config.claimed_cells_cap))
            .await?;
        let totals = self.world_totals().await?;
        if totals.total_claimed as usize > claimed_cells.len() {
            debug!(
                total = totals.total_claimed,
                returned = claimed_cells.len(),
                "world state cell list capped"
            );
        }
        Ok(WorldState {
            claimed_cells,
            country_stats: self.country_stats(self.config.country_stats_size).await?,
            total_claimed: totals.total_claimed,
            total_pixels: totals.total_pixels,
            world_percentage: totals.world_percentage,
        })
    }

    pub async fn actor_stats(&self, actor_id: &str) -> Result<ActorStats, AggregationError> {
        let ranked = self.ranked_actors().await?;
        let position = ranked.iter().position(|(id, _)| id == actor_id);
        let score = position.map_or(0, |i| ranked[i].1);
        let claimed_cells = self.store.scard(&keys::actor_cells(actor_id)).await?;
        let pixels_painted = self
            .store
            .hget(keys::ACTOR_PIXELS, actor_id)
            .await?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        Ok(ActorStats {
            handle: display_handle(actor_id),
            score,
            claimed_cells,
            pixels_painted,
            rank: position.filter(|_| score > 0).map(|i| i + 1),
        })
    }

    /// Aggregate for one country, including countries with nothing claimed.
    pub async fn country_detail(&self, code: &str) -> Result<CountryStat, AggregationError> {
        self.country_stat(CountryCode::new(code.trim())).await
    }

    async fn country_stat(&self, code: CountryCode) -> Result<CountryStat, AggregationError> {
        let revealed_count = self
            .store
            .scard(&keys::country_cells(code.as_str()))
            .await?;
        let info = self.countries.info(&code);
        Ok(CountryStat {
            percentage: percentage(revealed_count, info.total_cells),
            code: info.code,
            name: info.name,
            flag: info.flag,
            revealed_count,
            total_cells: info.total_cells,
        })
    }

    /// Every actor with a readable score, best first.
    async fn ranked_actors(&self) -> Result<Vec<(String, u64)>, AggregationError> {
        let raw = self.store.hgetall(keys::ACTOR_SCORES).await?;
        let mut ranked: Vec<(String, u64)> = raw
            .into_iter()
            .filter_map(|(actor_id, score)| match score.parse::<u64>() {
                Ok(score) => Some((actor_id, score)),
                Err(e) => {
                    warn!(actor_id, error = %e, "skipping unreadable actor score");
                    None
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(ranked)
    }
}
