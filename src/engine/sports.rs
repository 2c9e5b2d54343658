/// Sport model registry.
///
/// Maps a sport slug to the statistical parameters used by the live pricing
/// models. The built-in table is a `match` over the slug; runtime overrides
/// from `config.toml` are merged once at startup and the registry is
/// read-only afterwards.
use crate::config::SportOverride;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which probability model prices a sport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelFamily {
    /// Independent Poisson scoring per side. Sports with draws.
    Poisson,
    /// Gaussian final score margin. Sports without draws.
    Margin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SportModelConfig {
    pub total_time_minutes: f64,
    pub has_draws: bool,
    /// Expected scoring units over a full match.
    pub avg_rate_home: f64,
    pub avg_rate_away: f64,
    pub model_family: ModelFamily,
    /// Multiplicative overround, 1.06 = 6% edge.
    pub live_margin: f64,
    /// Only read by the margin model.
    pub score_std_dev_per_minute: f64,
    /// Short-format simulated sports fall back to the match midpoint.
    pub is_virtual: bool,
}

impl SportModelConfig {
    fn poisson(total: f64, home: f64, away: f64, margin: f64) -> Self {
        Self {
            total_time_minutes: total,
            has_draws: true,
            avg_rate_home: home,
            avg_rate_away: away,
            model_family: ModelFamily::Poisson,
            live_margin: margin,
            score_std_dev_per_minute: 0.0,
            is_virtual: false,
        }
    }

    fn margin(total: f64, home: f64, away: f64, margin: f64, std_dev: f64) -> Self {
        Self {
            total_time_minutes: total,
            has_draws: false,
            avg_rate_home: home,
            avg_rate_away: away,
            model_family: ModelFamily::Margin,
            live_margin: margin,
            score_std_dev_per_minute: std_dev,
            is_virtual: false,
        }
    }

    fn virtual_format(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Check the registry invariants for one entry.
    pub fn validate(&self, slug: &str) -> Result<()> {
        if !(self.total_time_minutes > 0.0) {
            bail!("sport {slug}: total_time_minutes must be > 0, got {}", self.total_time_minutes);
        }
        if !(self.live_margin >= 1.0) {
            bail!("sport {slug}: live_margin must be >= 1.0, got {}", self.live_margin);
        }
        if !(self.avg_rate_home >= 0.0) || !(self.avg_rate_away >= 0.0) {
            bail!("sport {slug}: scoring rates must be non-negative");
        }
        if !(self.score_std_dev_per_minute >= 0.0) {
            bail!("sport {slug}: score_std_dev_per_minute must be non-negative");
        }
        Ok(())
    }
}

/// Slugs with a built-in entry.
pub const BUILTIN_SPORTS: &[&str] = &[
    "football",
    "ice-hockey",
    "handball",
    "rugby",
    "e-football",
    "basketball",
    "american-football",
    "volleyball",
    "baseball",
    "e-basketball",
];

/// Built-in parameters for a sport slug.
pub fn builtin(slug: &str) -> Option<SportModelConfig> {
    let config = match slug {
        // 90 + stoppage time
        "football" => SportModelConfig::poisson(95.0, 1.37, 1.13, 1.06),
        "ice-hockey" => SportModelConfig::poisson(60.0, 3.10, 2.80, 1.07),
        "handball" => SportModelConfig::poisson(60.0, 29.0, 27.0, 1.07),
        "rugby" => SportModelConfig::poisson(80.0, 24.0, 20.0, 1.07),
        // 2 x 6 minute halves
        "e-football" => SportModelConfig::poisson(12.0, 2.60, 2.30, 1.08).virtual_format(),
        "basketball" => SportModelConfig::margin(48.0, 112.0, 109.0, 1.05, 1.80),
        "american-football" => SportModelConfig::margin(60.0, 24.5, 21.5, 1.05, 1.75),
        // scored in sets
        "volleyball" => SportModelConfig::margin(100.0, 1.55, 1.45, 1.06, 0.15),
        // one inning ~ 20 minutes
        "baseball" => SportModelConfig::margin(180.0, 4.6, 4.3, 1.06, 0.31),
        // 4 x 10 minute quarters
        "e-basketball" => SportModelConfig::margin(40.0, 75.0, 72.0, 1.08, 1.60).virtual_format(),
        _ => return None,
    };
    Some(config)
}

/// Immutable sport slug -> parameters lookup.
#[derive(Debug, Clone)]
pub struct SportRegistry {
    sports: HashMap<String, SportModelConfig>,
}

impl Default for SportRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SportRegistry {
    pub fn builtin() -> Self {
        let sports = BUILTIN_SPORTS
            .iter()
            .filter_map(|slug| builtin(slug).map(|c| (slug.to_string(), c)))
            .collect();
        Self { sports }
    }

    /// Built-in table with `[sports.<slug>]` overrides applied.
    pub fn with_overrides(overrides: &HashMap<String, SportOverride>) -> Result<Self> {
        let mut registry = Self::builtin();
        for (slug, o) in overrides {
            let Some(entry) = registry.sports.get_mut(slug) else {
                bail!("no built-in model for sport {slug}; overrides cannot add new sports");
            };
            if let Some(v) = o.total_time_minutes { entry.total_time_minutes = v; }
            if let Some(v) = o.avg_rate_home { entry.avg_rate_home = v; }
            if let Some(v) = o.avg_rate_away { entry.avg_rate_away = v; }
            if let Some(v) = o.live_margin { entry.live_margin = v; }
            if let Some(v) = o.score_std_dev_per_minute { entry.score_std_dev_per_minute = v; }
            entry.validate(slug)?;
        }
        Ok(registry)
    }

    pub fn get(&self, slug: &str) -> Option<&SportModelConfig> {
        self.sports.get(slug)
    }

    pub fn len(&self) -> usize {
        self.sports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sports.is_empty()
    }
}
