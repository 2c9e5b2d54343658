pub mod metadata;

use metadata::MetadataMap;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a sporting event as kept by the event store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Scheduled,
    Live,
    Finished,
    Cancelled,
}

/// Normalized live state of one event, read-only input to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveEventSnapshot {
    pub event_id: String,
    pub sport_slug: String,
    pub home_score: u32,
    pub away_score: u32,
    #[serde(default)]
    pub metadata: Option<MetadataMap>,
}

/// Event fields the market synchronizer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub event_id: String,
    pub home_team: String,
    pub away_team: String,
    pub status: EventStatus,
    pub is_live: bool,
}

impl EventSummary {
    /// Both the status and the live flag must be asserted.
    pub fn is_in_play(&self) -> bool {
        self.status == EventStatus::Live && self.is_live
    }
}
