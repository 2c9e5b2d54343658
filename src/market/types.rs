use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketType {
    /// Home / (draw) / away primary market.
    MatchWinner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    Open,
    Suspended,
    Settled,
    Cancelled,
    Voided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Home,
    Away,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionStatus {
    Active,
    Suspended,
    Won,
    Lost,
    Void,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionResult {
    Won,
    Lost,
    Void,
    Push,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub id: String,
    pub name: String,
    pub outcome: Outcome,
    pub odds: f64,
    pub status: SelectionStatus,
    #[serde(default)]
    pub result: Option<SelectionResult>,
    pub updated_at: DateTime<Utc>,
}

impl Selection {
    pub fn is_active(&self) -> bool {
        self.status == SelectionStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub event_id: String,
    pub market_type: MarketType,
    pub name: String,
    pub status: MarketStatus,
    /// Display order is preserved.
    pub selections: Vec<Selection>,
    pub updated_at: DateTime<Utc>,
}

impl Market {
    pub fn is_open(&self) -> bool {
        self.status == MarketStatus::Open
    }

    pub fn active_selections(&self) -> impl Iterator<Item = &Selection> {
        self.selections.iter().filter(|s| s.is_active())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSelection {
    pub name: String,
    pub outcome: Outcome,
    pub odds: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMarket {
    pub event_id: String,
    pub market_type: MarketType,
    pub name: String,
    pub selections: Vec<NewSelection>,
}
