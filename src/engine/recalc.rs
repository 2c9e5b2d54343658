use crate::engine::elapsed::resolve_elapsed_minutes;
use crate::engine::poisson::PoissonTuning;
use crate::engine::sports::SportRegistry;
use crate::engine::{model_probabilities, price, RecalcError, RecalcResult, SkipReason};
use crate::feed::metadata::MetadataMap;
use crate::market::sync::{sync_market_odds, SyncOutcome};
use crate::market::{EventLocks, EventReader, MarketStore};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;

const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Live in-play odds recalculation: model -> prices -> primary market.
pub struct LiveOddsEngine {
    store: Arc<dyn MarketStore>,
    events: Arc<dyn EventReader>,
    registry: Arc<SportRegistry>,
    tuning: PoissonTuning,
    locks: Arc<EventLocks>,
    max_concurrency: usize,
}

impl LiveOddsEngine {
    pub fn new(
        store: Arc<dyn MarketStore>,
        events: Arc<dyn EventReader>,
        registry: Arc<SportRegistry>,
    ) -> Self {
        Self {
            store,
            events,
            registry,
            tuning: PoissonTuning::default(),
            locks: Arc::new(EventLocks::new()),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_tuning(mut self, tuning: PoissonTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Share the per-event lock with other triggers (manual reprice, webhooks).
    pub fn with_locks(mut self, locks: Arc<EventLocks>) -> Self {
        self.locks = locks;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn locks(&self) -> Arc<EventLocks> {
        self.locks.clone()
    }

    /// Reprice one live event. Never fails: `updated` is the success signal.
    pub async fn recalculate_live_odds(
        &self,
        event_id: &str,
        home_score: u32,
        away_score: u32,
        sport_slug: &str,
        metadata: Option<MetadataMap>,
    ) -> RecalcResult {
        match self
            .try_recalculate(event_id, home_score, away_score, sport_slug, metadata.as_ref())
            .await
        {
            Ok(result) => result,
            Err(RecalcError::ConfigMissing(sport)) => {
                tracing::debug!(event_id, sport = %sport, "no sport model, skipping");
                RecalcResult::skipped(SkipReason::UnknownSport)
            }
            Err(RecalcError::ElapsedTimeUnresolvable(sport)) => {
                tracing::debug!(event_id, sport = %sport, "elapsed time unresolvable, skipping");
                RecalcResult::skipped(SkipReason::ElapsedUnresolved)
            }
            Err(e) => {
                tracing::warn!(event_id, sport = sport_slug, error = %e, "live odds recalculation failed");
                RecalcResult::failed()
            }
        }
    }

    async fn try_recalculate(
        &self,
        event_id: &str,
        home_score: u32,
        away_score: u32,
        sport_slug: &str,
        metadata: Option<&MetadataMap>,
    ) -> Result<RecalcResult, RecalcError> {
        let config = self
            .registry
            .get(sport_slug)
            .ok_or_else(|| RecalcError::ConfigMissing(sport_slug.to_string()))?;
        let elapsed = resolve_elapsed_minutes(sport_slug, metadata, config)
            .ok_or_else(|| RecalcError::ElapsedTimeUnresolvable(sport_slug.to_string()))?;

        let probs = model_probabilities(home_score, away_score, elapsed, config, &self.tuning);
        let odds = price(&probs, config);

        let _guard = self.locks.acquire(event_id).await;
        let event = self
            .events
            .find_event(event_id)
            .await?
            .ok_or_else(|| RecalcError::EventNotFound(event_id.to_string()))?;

        let result = match sync_market_odds(self.store.as_ref(), &event, &odds).await? {
            SyncOutcome::Skipped(reason) => RecalcResult::skipped(reason),
            SyncOutcome::Created(_) | SyncOutcome::Updated { .. } => {
                tracing::info!(
                    event_id,
                    sport = sport_slug,
                    score = %format!("{home_score}-{away_score}"),
                    elapsed = %format!("{elapsed:.1}"),
                    home = odds.home,
                    draw = ?odds.draw,
                    away = odds.away,
                    "live odds updated"
                );
                RecalcResult::updated(odds)
            }
        };
        Ok(result)
    }

    /// Reprice every live event. Returns how many markets were written.
    pub async fn recalculate_all_live_odds(&self) -> usize {
        let events = match self.events.live_events().await {
            Ok(events) => events,
            Err(e) => {
                tracing::error!(error = %e, "failed to read live events");
                return 0;
            }
        };
        let total = events.len();

        let results: Vec<_> = stream::iter(events)
            .map(|event| async move {
                self.recalculate_live_odds(
                    &event.event_id,
                    event.home_score,
                    event.away_score,
                    &event.sport_slug,
                    event.metadata,
                )
                .await
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let updated = results.iter().filter(|r| r.updated).count();
        tracing::info!(total, updated, "live odds pass complete");
        updated
    }
}
