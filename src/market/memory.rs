use super::types::{
    Market, MarketStatus, MarketType, NewMarket, Selection, SelectionStatus,
};
use super::{EventReader, MarketStore, StoreError, StoreResult};
use crate::feed::metadata::MetadataMap;
use crate::feed::{EventStatus, EventSummary, LiveEventSnapshot};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// One event as kept by the event store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub sport_slug: String,
    pub home_team: String,
    pub away_team: String,
    pub status: EventStatus,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub home_score: u32,
    #[serde(default)]
    pub away_score: u32,
    #[serde(default)]
    pub metadata: Option<MetadataMap>,
}

impl EventRecord {
    fn summary(&self) -> EventSummary {
        EventSummary {
            event_id: self.id.clone(),
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            status: self.status,
            is_live: self.is_live,
        }
    }

    fn snapshot(&self) -> LiveEventSnapshot {
        LiveEventSnapshot {
            event_id: self.id.clone(),
            sport_slug: self.sport_slug.clone(),
            home_score: self.home_score,
            away_score: self.away_score,
            metadata: self.metadata.clone(),
        }
    }
}

/// Serialized form of the whole store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub markets: Vec<Market>,
    #[serde(default)]
    pub next_id: u64,
}

/// Event + market store held in memory, snapshotted to a JSON file.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: StoreState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Missing file yields an empty store.
    pub async fn load(path: &Path) -> StoreResult<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no state file, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        let state: StoreState = serde_json::from_str(&content)?;
        Ok(Self::from_state(state))
    }

    /// Write via a temp file so a crash never leaves a truncated snapshot.
    pub async fn save(&self, path: &Path) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(&*self.lock())?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    pub fn snapshot(&self) -> StoreState {
        self.lock().clone()
    }

    /// Insert or replace an event by id.
    pub fn upsert_event(&self, event: EventRecord) {
        let mut state = self.lock();
        match state.events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event,
            None => state.events.push(event),
        }
    }

    /// Seed a market as-is (ids are kept).
    pub fn insert_market(&self, market: Market) {
        self.lock().markets.push(market);
    }

    pub fn market(&self, market_id: &str) -> Option<Market> {
        self.lock().markets.iter().find(|m| m.id == market_id).cloned()
    }

    pub fn markets_for_event(&self, event_id: &str) -> Vec<Market> {
        self.lock()
            .markets
            .iter()
            .filter(|m| m.event_id == event_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StoreState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

#[async_trait]
impl MarketStore for InMemoryStore {
    async fn find_market(&self, event_id: &str, market_type: MarketType) -> StoreResult<Option<Market>> {
        Ok(self
            .lock()
            .markets
            .iter()
            .find(|m| m.event_id == event_id && m.market_type == market_type)
            .cloned())
    }

    async fn create_market(&self, market: NewMarket) -> StoreResult<Market> {
        let mut state = self.lock();
        let now = Utc::now();
        let id = state.next_id("mkt");
        let selections = market
            .selections
            .into_iter()
            .map(|s| Selection {
                id: state.next_id("sel"),
                name: s.name,
                outcome: s.outcome,
                odds: s.odds,
                status: SelectionStatus::Active,
                result: None,
                updated_at: now,
            })
            .collect();
        let created = Market {
            id,
            event_id: market.event_id,
            market_type: market.market_type,
            name: market.name,
            status: MarketStatus::Open,
            selections,
            updated_at: now,
        };
        state.markets.push(created.clone());
        Ok(created)
    }

    async fn update_market_status(&self, market_id: &str, status: MarketStatus) -> StoreResult<()> {
        let mut state = self.lock();
        let market = state
            .markets
            .iter_mut()
            .find(|m| m.id == market_id)
            .ok_or_else(|| StoreError::MarketNotFound(market_id.to_string()))?;
        market.status = status;
        market.updated_at = Utc::now();
        Ok(())
    }

    async fn update_selection_odds(&self, selection_id: &str, odds: f64) -> StoreResult<()> {
        let mut state = self.lock();
        let selection = state
            .markets
            .iter_mut()
            .flat_map(|m| m.selections.iter_mut())
            .find(|s| s.id == selection_id)
            .ok_or_else(|| StoreError::SelectionNotFound(selection_id.to_string()))?;
        selection.odds = odds;
        selection.updated_at = Utc::now();
        Ok(())
    }

    async fn reset_selections(&self, market_id: &str) -> StoreResult<usize> {
        let mut state = self.lock();
        let market = state
            .markets
            .iter_mut()
            .find(|m| m.id == market_id)
            .ok_or_else(|| StoreError::MarketNotFound(market_id.to_string()))?;
        let now = Utc::now();
        let mut reset = 0;
        for selection in market.selections.iter_mut().filter(|s| !s.is_active()) {
            selection.status = SelectionStatus::Active;
            selection.result = None;
            selection.updated_at = now;
            reset += 1;
        }
        Ok(reset)
    }
}

#[async_trait]
impl EventReader for InMemoryStore {
    async fn live_events(&self) -> StoreResult<Vec<LiveEventSnapshot>> {
        Ok(self
            .lock()
            .events
            .iter()
            .filter(|e| e.summary().is_in_play())
            .map(EventRecord::snapshot)
            .collect())
    }

    async fn find_event(&self, event_id: &str) -> StoreResult<Option<EventSummary>> {
        Ok(self
            .lock()
            .events
            .iter()
            .find(|e| e.id == event_id)
            .map(EventRecord::summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::{NewSelection, Outcome, SelectionResult};

    fn event(id: &str, status: EventStatus, is_live: bool) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            sport_slug: "football".to_string(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            status,
            is_live,
            home_score: 1,
            away_score: 0,
            metadata: None,
        }
    }

    fn new_market(event_id: &str) -> NewMarket {
        NewMarket {
            event_id: event_id.to_string(),
            market_type: MarketType::MatchWinner,
            name: "Match Result".to_string(),
            selections: vec![
                NewSelection { name: "Arsenal".to_string(), outcome: Outcome::Home, odds: 1.8 },
                NewSelection { name: "Chelsea".to_string(), outcome: Outcome::Away, odds: 4.5 },
            ],
        }
    }

    #[tokio::test]
    async fn test_live_events_needs_status_and_flag() {
        let store = InMemoryStore::new();
        store.upsert_event(event("e1", EventStatus::Live, true));
        store.upsert_event(event("e2", EventStatus::Live, false));
        store.upsert_event(event("e3", EventStatus::Finished, true));
        let live = store.live_events().await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].event_id, "e1");
        assert_eq!(live[0].home_score, 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_event() {
        let store = InMemoryStore::new();
        store.upsert_event(event("e1", EventStatus::Live, true));
        let mut updated = event("e1", EventStatus::Live, true);
        updated.home_score = 3;
        store.upsert_event(updated);
        let live = store.live_events().await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].home_score, 3);
    }

    #[tokio::test]
    async fn test_create_and_find_market() {
        let store = InMemoryStore::new();
        let created = store.create_market(new_market("e1")).await.unwrap();
        assert_eq!(created.status, MarketStatus::Open);
        assert_eq!(created.selections.len(), 2);
        assert!(created.selections.iter().all(|s| s.is_active()));
        assert_ne!(created.selections[0].id, created.selections[1].id);

        let found = store.find_market("e1", MarketType::MatchWinner).await.unwrap();
        assert_eq!(found, Some(created));
        assert!(store.find_market("e2", MarketType::MatchWinner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_selections_only_touches_inactive() {
        let store = InMemoryStore::new();
        let market = store.create_market(new_market("e1")).await.unwrap();
        {
            let mut state = store.lock();
            let sel = &mut state.markets[0].selections[1];
            sel.status = SelectionStatus::Lost;
            sel.result = Some(SelectionResult::Lost);
        }
        assert_eq!(store.reset_selections(&market.id).await.unwrap(), 1);
        let market = store.market(&market.id).unwrap();
        assert!(market.selections.iter().all(|s| s.is_active() && s.result.is_none()));
    }

    #[tokio::test]
    async fn test_missing_ids_are_errors() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.update_market_status("nope", MarketStatus::Open).await,
            Err(StoreError::MarketNotFound(_))
        ));
        assert!(matches!(
            store.update_selection_odds("nope", 2.0).await,
            Err(StoreError::SelectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("live-odds-store-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("state.json");

        let store = InMemoryStore::new();
        store.upsert_event(event("e1", EventStatus::Live, true));
        store.create_market(new_market("e1")).await.unwrap();
        store.save(&path).await.unwrap();

        let loaded = InMemoryStore::load(&path).await.unwrap();
        let before = store.snapshot();
        let after = loaded.snapshot();
        assert_eq!(before.events, after.events);
        assert_eq!(before.markets, after.markets);
        assert_eq!(before.next_id, after.next_id);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let path = std::env::temp_dir().join("live-odds-does-not-exist.json");
        let store = InMemoryStore::load(&path).await.unwrap();
        assert!(store.snapshot().events.is_empty());
    }
}
