/// Bivariate Poisson scoring model for sports with draws.
///
/// Each side's remaining score is an independent Poisson count whose mean is
/// the full-match scoring rate scaled by the remaining time ratio. Outcome
/// probabilities come from summing the joint mass of every combination of
/// additional scores, bucketed by the resulting final score.
use crate::engine::sports::SportModelConfig;
use crate::engine::Probabilities;
use serde::Deserialize;

/// Returned when the enumeration carries no mass at all.
pub const DEGENERATE_PRIOR: Probabilities = Probabilities {
    home: 0.4,
    draw: 0.2,
    away: 0.4,
};

/// Empirical enumeration constants.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PoissonTuning {
    /// Max additional scores per side for low-scoring sports.
    pub low_cutoff: u32,
    /// Max additional scores per side when a rate exceeds `high_rate_threshold`.
    pub high_cutoff: u32,
    pub high_rate_threshold: f64,
    /// Tail masses below this stop the enumeration.
    pub prune_threshold: f64,
}

impl Default for PoissonTuning {
    fn default() -> Self {
        Self {
            low_cutoff: 8,
            high_cutoff: 15,
            high_rate_threshold: 10.0,
            prune_threshold: 1e-8,
        }
    }
}

impl PoissonTuning {
    pub fn cutoff_for(&self, config: &SportModelConfig) -> u32 {
        if config.avg_rate_home.max(config.avg_rate_away) > self.high_rate_threshold {
            self.high_cutoff
        } else {
            self.low_cutoff
        }
    }
}

/// `P(k; λ)` for k = 0..=cutoff, built iteratively to avoid factorials.
fn pmf_series(lambda: f64, cutoff: u32) -> Vec<f64> {
    let mut out = Vec::with_capacity(cutoff as usize + 1);
    let mut p = (-lambda).exp();
    for k in 0..=cutoff {
        if k > 0 {
            p *= lambda / k as f64;
        }
        out.push(p);
    }
    out
}

/// Past the mode a mass below the threshold only shrinks further.
fn is_negligible_tail(k: u32, lambda: f64, mass: f64, threshold: f64) -> bool {
    k as f64 > lambda && mass < threshold
}

pub fn poisson_probabilities(
    home_score: u32,
    away_score: u32,
    elapsed_minutes: f64,
    config: &SportModelConfig,
    tuning: &PoissonTuning,
) -> Probabilities {
    let total = config.total_time_minutes;
    let remaining_ratio = (total - elapsed_minutes).max(1.0) / total;
    let lambda_home = config.avg_rate_home * remaining_ratio;
    let lambda_away = config.avg_rate_away * remaining_ratio;

    let cutoff = tuning.cutoff_for(config);
    let home_pmf = pmf_series(lambda_home, cutoff);
    let away_pmf = pmf_series(lambda_away, cutoff);

    let (mut home_win, mut draw, mut away_win) = (0.0, 0.0, 0.0);
    for (add_home, &p_home) in (0u32..).zip(home_pmf.iter()) {
        if is_negligible_tail(add_home, lambda_home, p_home, tuning.prune_threshold) {
            break;
        }
        let final_home = u64::from(home_score) + u64::from(add_home);
        for (add_away, &p_away) in (0u32..).zip(away_pmf.iter()) {
            if is_negligible_tail(add_away, lambda_away, p_away, tuning.prune_threshold) {
                break;
            }
            let mass = p_home * p_away;
            let final_away = u64::from(away_score) + u64::from(add_away);
            if final_home > final_away {
                home_win += mass;
            } else if final_home == final_away {
                draw += mass;
            } else {
                away_win += mass;
            }
        }
    }

    let total_mass = home_win + draw + away_win;
    if !(total_mass > 0.0) || !total_mass.is_finite() {
        tracing::debug!(lambda_home, lambda_away, "degenerate poisson mass, using prior");
        return DEGENERATE_PRIOR;
    }
    Probabilities {
        home: home_win / total_mass,
        draw: draw / total_mass,
        away: away_win / total_mass,
    }
}
