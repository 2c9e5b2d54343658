/// Market synchronizer.
///
/// Reconciles freshly computed odds with the event's persisted primary market:
///
///   no market                  -> create it with seeded selections
///   not OPEN, event in play    -> reopen, reset selections, re-read
///   not OPEN, event not live   -> skip
///   OPEN, < 2 active selections -> skip
///   OPEN, >= 2 active          -> write odds per active selection
use super::types::{Market, MarketStatus, MarketType, NewMarket, NewSelection, Outcome};
use super::{MarketStore, StoreError, StoreResult};
use crate::engine::{LiveOdds, SkipReason};
use crate::feed::EventSummary;

pub const PRIMARY_MARKET: MarketType = MarketType::MatchWinner;
const DRAW_LABEL: &str = "Draw";
const MIN_ACTIVE_SELECTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Created(Market),
    Updated { market_id: String, written: usize },
    Skipped(SkipReason),
}

impl SyncOutcome {
    pub fn is_written(&self) -> bool {
        !matches!(self, SyncOutcome::Skipped(_))
    }
}

fn odds_for(outcome: Outcome, odds: &LiveOdds) -> Option<f64> {
    match outcome {
        Outcome::Home => Some(odds.home),
        Outcome::Away => Some(odds.away),
        Outcome::Draw => odds.draw,
    }
}

fn seed_market(event: &EventSummary, odds: &LiveOdds) -> NewMarket {
    let mut selections = vec![NewSelection {
        name: event.home_team.clone(),
        outcome: Outcome::Home,
        odds: odds.home,
    }];
    if let Some(draw) = odds.draw {
        selections.push(NewSelection {
            name: DRAW_LABEL.to_string(),
            outcome: Outcome::Draw,
            odds: draw,
        });
    }
    selections.push(NewSelection {
        name: event.away_team.clone(),
        outcome: Outcome::Away,
        odds: odds.away,
    });
    let name = if odds.draw.is_some() { "Match Result" } else { "Match Winner" };
    NewMarket {
        event_id: event.event_id.clone(),
        market_type: PRIMARY_MARKET,
        name: name.to_string(),
        selections,
    }
}

/// Reopen a market settled while its event is still in play.
async fn recover_market(store: &dyn MarketStore, market: &Market) -> StoreResult<Market> {
    tracing::warn!(
        event_id = %market.event_id,
        market_id = %market.id,
        status = ?market.status,
        "market not open while event is live, reopening"
    );
    store.update_market_status(&market.id, MarketStatus::Open).await?;
    let reset = store.reset_selections(&market.id).await?;
    tracing::info!(market_id = %market.id, reset, "selections reset to active");
    store
        .find_market(&market.event_id, PRIMARY_MARKET)
        .await?
        .ok_or_else(|| StoreError::MarketNotFound(market.id.clone()))
}

pub async fn sync_market_odds(
    store: &dyn MarketStore,
    event: &EventSummary,
    odds: &LiveOdds,
) -> StoreResult<SyncOutcome> {
    let Some(mut market) = store.find_market(&event.event_id, PRIMARY_MARKET).await? else {
        let created = store.create_market(seed_market(event, odds)).await?;
        tracing::info!(event_id = %event.event_id, market_id = %created.id, "created live market");
        return Ok(SyncOutcome::Created(created));
    };

    if !market.is_open() {
        if !event.is_in_play() {
            return Ok(SyncOutcome::Skipped(SkipReason::MarketClosed));
        }
        market = recover_market(store, &market).await?;
    }

    let active = market.active_selections().count();
    if active < MIN_ACTIVE_SELECTIONS {
        tracing::debug!(event_id = %event.event_id, active, "not enough active selections");
        return Ok(SyncOutcome::Skipped(SkipReason::InsufficientSelections));
    }

    let mut written = 0;
    for selection in market.active_selections() {
        let Some(price) = odds_for(selection.outcome, odds) else { continue };
        store.update_selection_odds(&selection.id, price).await?;
        written += 1;
    }
    Ok(SyncOutcome::Updated {
        market_id: market.id,
        written,
    })
}
