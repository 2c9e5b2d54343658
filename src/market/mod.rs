pub mod lock;
pub mod memory;
pub mod sync;
pub mod types;

use crate::feed::{EventSummary, LiveEventSnapshot};
use async_trait::async_trait;
use types::{Market, MarketStatus, MarketType, NewMarket};

pub use lock::EventLocks;
pub use memory::InMemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("market not found: {0}")]
    MarketNotFound(String),

    #[error("selection not found: {0}")]
    SelectionNotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persisted markets and selections.
#[async_trait]
pub trait MarketStore: Send + Sync {
    async fn find_market(&self, event_id: &str, market_type: MarketType) -> StoreResult<Option<Market>>;

    async fn create_market(&self, market: NewMarket) -> StoreResult<Market>;

    async fn update_market_status(&self, market_id: &str, status: MarketStatus) -> StoreResult<()>;

    async fn update_selection_odds(&self, selection_id: &str, odds: f64) -> StoreResult<()>;

    /// Set every non-active selection back to active with its result cleared.
    /// Returns how many selections changed.
    async fn reset_selections(&self, market_id: &str) -> StoreResult<usize>;
}

/// Read side of the external event store.
#[async_trait]
pub trait EventReader: Send + Sync {
    /// Events with status LIVE and the live flag set.
    async fn live_events(&self) -> StoreResult<Vec<LiveEventSnapshot>>;

    async fn find_event(&self, event_id: &str) -> StoreResult<Option<EventSummary>>;
}
