pub mod config;
pub mod engine;
pub mod feed;
pub mod market;

pub use engine::{LiveOdds, LiveOddsEngine, RecalcResult, SkipReason};
pub use feed::metadata::MetadataMap;
pub use market::{EventReader, InMemoryStore, MarketStore};
