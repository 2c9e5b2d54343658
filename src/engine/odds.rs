/// Decimal odds from a fair probability.
///
/// Margin-on-probability pricing: each outcome is priced independently as
/// `margin / p`, so every price carries the full house edge.
pub const MIN_ODDS: f64 = 1.02;
pub const MAX_ODDS: f64 = 31.00;

/// At or below this the outcome is priced at the ceiling.
const LONGSHOT_PROB: f64 = 0.01;
/// At or above this the outcome is priced at the floor.
const CERTAINTY_PROB: f64 = 0.98;

pub fn odds_from_probability(p: f64, margin: f64) -> f64 {
    if p.is_nan() || p <= LONGSHOT_PROB {
        return MAX_ODDS;
    }
    if p >= CERTAINTY_PROB {
        return MIN_ODDS;
    }
    round2((margin / p).clamp(MIN_ODDS, MAX_ODDS))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extremes_hit_bounds() {
        assert_eq!(odds_from_probability(0.0, 1.06), MAX_ODDS);
        assert_eq!(odds_from_probability(0.01, 1.06), MAX_ODDS);
        assert_eq!(odds_from_probability(0.98, 1.06), MIN_ODDS);
        assert_eq!(odds_from_probability(1.0, 1.06), MIN_ODDS);
    }

    #[test]
    fn test_margin_over_probability() {
        assert_eq!(odds_from_probability(0.5, 1.06), 2.12);
        assert_eq!(odds_from_probability(0.25, 1.0), 4.0);
        // 1.06 / 0.3 = 3.5333..
        assert_eq!(odds_from_probability(0.3, 1.06), 3.53);
    }

    #[test]
    fn test_clamped_inside_pricing_band() {
        // 1.06 / 0.02 = 53 -> ceiling
        assert_eq!(odds_from_probability(0.02, 1.06), MAX_ODDS);
        // 1.0 / 0.979 = 1.0214 -> 1.02
        assert_eq!(odds_from_probability(0.979, 1.0), 1.02);
    }

    #[test]
    fn test_always_within_bounds() {
        for margin in [1.0, 1.03, 1.06, 1.2, 2.0] {
            for i in 0..=1000 {
                let p = i as f64 / 1000.0;
                let odds = odds_from_probability(p, margin);
                assert!((MIN_ODDS..=MAX_ODDS).contains(&odds), "p={p} margin={margin} odds={odds}");
            }
        }
    }

    #[test]
    fn test_non_increasing_in_probability() {
        for margin in [1.0, 1.06, 1.5] {
            let mut prev = f64::INFINITY;
            for i in 0..=1000 {
                let p = i as f64 / 1000.0;
                let odds = odds_from_probability(p, margin);
                assert!(odds <= prev, "p={p} margin={margin}: {odds} > {prev}");
                prev = odds;
            }
        }
    }
}
