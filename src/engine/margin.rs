/// Gaussian score-margin model for sports without draws.
///
/// Model: final margin ~ N(current margin + drift, sd) where
///   - `drift = (rate_home - rate_away) / total * remaining`
///   - `sd = score_std_dev_per_minute * sqrt(remaining)`
///
/// `P(home_win) = Φ(expected_margin / sd)`, clamped to [0.005, 0.995].
use crate::engine::sports::SportModelConfig;
use crate::engine::Probabilities;

const MIN_REMAINING_MINUTES: f64 = 0.5;
const MIN_HOME_PROB: f64 = 0.005;
const MAX_HOME_PROB: f64 = 0.995;
/// Outcome probability once the remaining variance has vanished.
const DECIDED_PROB: f64 = 0.99;
const STD_DEV_EPSILON: f64 = 1e-9;

/// Error function, Abramowitz & Stegun 7.1.26 (|error| < 1.5e-7).
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

pub fn margin_probabilities(
    home_score: u32,
    away_score: u32,
    elapsed_minutes: f64,
    config: &SportModelConfig,
) -> Probabilities {
    let total = config.total_time_minutes;
    let remaining = (total - elapsed_minutes).max(MIN_REMAINING_MINUTES);
    let current_margin = home_score as f64 - away_score as f64;
    let drift = (config.avg_rate_home / total - config.avg_rate_away / total) * remaining;
    let expected_margin = current_margin + drift;
    let std_dev = config.score_std_dev_per_minute * remaining.sqrt();

    if std_dev.abs() < STD_DEV_EPSILON {
        let home = if current_margin > 0.0 {
            DECIDED_PROB
        } else if current_margin < 0.0 {
            1.0 - DECIDED_PROB
        } else {
            0.5
        };
        return Probabilities::two_way(home);
    }

    let home = normal_cdf(expected_margin / std_dev).clamp(MIN_HOME_PROB, MAX_HOME_PROB);
    Probabilities::two_way(home)
}
