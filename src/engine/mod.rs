pub mod elapsed;
pub mod margin;
pub mod odds;
pub mod poisson;
pub mod recalc;
pub mod sports;

use crate::market::StoreError;
use poisson::PoissonTuning;
use serde::Serialize;
use sports::{ModelFamily, SportModelConfig};

pub use recalc::LiveOddsEngine;

/// Match outcome probabilities. `draw` is 0 for two-way sports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl Probabilities {
    pub fn two_way(home: f64) -> Self {
        Self {
            home,
            draw: 0.0,
            away: 1.0 - home,
        }
    }

    pub fn sum(&self) -> f64 {
        self.home + self.draw + self.away
    }
}

/// Decimal prices for the primary market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LiveOdds {
    pub home: f64,
    pub away: f64,
    pub draw: Option<f64>,
}

/// Why an event was left unpriced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownSport,
    ElapsedUnresolved,
    /// Market is not open and the event is no longer in play.
    MarketClosed,
    InsufficientSelections,
}

/// Outcome of one recalculation. `updated` is the only success signal.
#[derive(Debug, Clone, PartialEq)]
pub struct RecalcResult {
    pub updated: bool,
    /// Odds written to the market, when `updated`.
    pub new_odds: Option<LiveOdds>,
    pub skipped: Option<SkipReason>,
}

impl RecalcResult {
    pub fn updated(odds: LiveOdds) -> Self {
        Self {
            updated: true,
            new_odds: Some(odds),
            skipped: None,
        }
    }

    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            updated: false,
            new_odds: None,
            skipped: Some(reason),
        }
    }

    pub fn failed() -> Self {
        Self {
            updated: false,
            new_odds: None,
            skipped: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecalcError {
    #[error("no sport model configured for {0}")]
    ConfigMissing(String),

    #[error("elapsed time unresolvable for {0}")]
    ElapsedTimeUnresolvable(String),

    #[error("event not found: {0}")]
    EventNotFound(String),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

/// Fair probabilities for the current state, routed by model family.
pub fn model_probabilities(
    home_score: u32,
    away_score: u32,
    elapsed_minutes: f64,
    config: &SportModelConfig,
    tuning: &PoissonTuning,
) -> Probabilities {
    match config.model_family {
        ModelFamily::Poisson => {
            poisson::poisson_probabilities(home_score, away_score, elapsed_minutes, config, tuning)
        }
        ModelFamily::Margin => {
            margin::margin_probabilities(home_score, away_score, elapsed_minutes, config)
        }
    }
}

/// Probabilities -> margin-adjusted decimal odds.
pub fn price(probs: &Probabilities, config: &SportModelConfig) -> LiveOdds {
    let margin = config.live_margin;
    LiveOdds {
        home: odds::odds_from_probability(probs.home, margin),
        away: odds::odds_from_probability(probs.away, margin),
        draw: config
            .has_draws
            .then(|| odds::odds_from_probability(probs.draw, margin)),
    }
}
