/// Elapsed-time resolver.
///
/// Derives "minutes played" from heterogeneous live metadata. Rules are
/// tried in order and the first one yielding a value wins:
///
///   1. a positive numeric `elapsed` field, or a provider `timer` object
///   2. a per-sport period/status code table (tuned period midpoints)
///   3. virtual sports: an elapsed clock string, else the match midpoint
///
/// `None` means the event must not be repriced.
use crate::engine::sports::SportModelConfig;
use crate::feed::metadata::{self, MetadataMap};

/// Keys that may carry a period or status code.
const PERIOD_KEYS: &[&str] = &["period", "period_code", "status"];

/// Keys that may carry a clock string on virtual feeds.
const CLOCK_KEYS: &[&str] = &["elapsed", "clock"];

struct ElapsedInput<'a> {
    sport_slug: &'a str,
    meta: &'a MetadataMap,
    config: &'a SportModelConfig,
}

type Extractor = fn(&ElapsedInput) -> Option<f64>;

const RULES: &[Extractor] = &[explicit_elapsed, provider_timer, period_code, virtual_clock];

/// Minutes played, clamped to `[0, total - 1]`.
pub fn resolve_elapsed_minutes(
    sport_slug: &str,
    meta: Option<&MetadataMap>,
    config: &SportModelConfig,
) -> Option<f64> {
    let empty = MetadataMap::new();
    let input = ElapsedInput {
        sport_slug,
        meta: meta.unwrap_or(&empty),
        config,
    };
    RULES
        .iter()
        .find_map(|rule| rule(&input))
        .map(|minutes| clamp_minutes(minutes, config))
}

fn clamp_minutes(minutes: f64, config: &SportModelConfig) -> f64 {
    let upper = (config.total_time_minutes - 1.0).max(0.0);
    minutes.clamp(0.0, upper)
}

fn explicit_elapsed(input: &ElapsedInput) -> Option<f64> {
    metadata::number(input.meta, "elapsed").filter(|m| *m > 0.0)
}

/// `{"timer": {"tm": 63, "ts": 30}}` style clocks.
fn provider_timer(input: &ElapsedInput) -> Option<f64> {
    let minutes = metadata::nested_number(input.meta, "timer", "tm")?;
    let seconds = metadata::nested_number(input.meta, "timer", "ts").unwrap_or(0.0);
    Some(minutes + seconds / 60.0).filter(|m| *m > 0.0)
}

fn period_code(input: &ElapsedInput) -> Option<f64> {
    let table = period_table(input.sport_slug);
    if table.is_empty() {
        return None;
    }
    PERIOD_KEYS.iter().find_map(|key| {
        let code = metadata::text(input.meta, key)?.to_ascii_uppercase();
        table
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, minute)| *minute)
    })
}

fn virtual_clock(input: &ElapsedInput) -> Option<f64> {
    if !input.config.is_virtual {
        return None;
    }
    let parsed = CLOCK_KEYS.iter().find_map(|key| {
        metadata::text(input.meta, key).and_then(metadata::parse_elapsed_text)
    });
    Some(parsed.unwrap_or(input.config.total_time_minutes / 2.0))
}

/// Representative minute for each period code, per sport.
fn period_table(sport_slug: &str) -> &'static [(&'static str, f64)] {
    match sport_slug {
        "football" => &[
            ("1H", 25.0),
            ("HT", 45.0),
            ("2H", 70.0),
            ("ET", 95.0),
        ],
        "basketball" => &[
            ("Q1", 6.0),
            ("Q2", 18.0),
            ("HT", 24.0),
            ("Q3", 30.0),
            ("Q4", 42.0),
            ("OT", 48.0),
        ],
        "ice-hockey" => &[
            ("P1", 10.0),
            ("1P", 10.0),
            ("INT1", 20.0),
            ("P2", 30.0),
            ("2P", 30.0),
            ("INT2", 40.0),
            ("P3", 50.0),
            ("3P", 50.0),
            ("OT", 60.0),
            ("SO", 60.0),
        ],
        "handball" => &[
            ("1H", 15.0),
            ("HT", 30.0),
            ("2H", 45.0),
            ("ET", 60.0),
        ],
        "rugby" => &[
            ("1H", 20.0),
            ("HT", 40.0),
            ("2H", 60.0),
            ("ET", 80.0),
        ],
        "volleyball" => &[
            ("S1", 10.0),
            ("S2", 30.0),
            ("S3", 50.0),
            ("S4", 70.0),
            ("S5", 90.0),
        ],
        "american-football" => &[
            ("Q1", 7.5),
            ("Q2", 22.5),
            ("HT", 30.0),
            ("Q3", 37.5),
            ("Q4", 52.5),
            ("OT", 60.0),
        ],
        "baseball" => &[
            ("I1", 10.0),
            ("I2", 30.0),
            ("I3", 50.0),
            ("I4", 70.0),
            ("I5", 90.0),
            ("I6", 110.0),
            ("I7", 130.0),
            ("I8", 150.0),
            ("I9", 170.0),
            ("EI", 180.0),
        ],
        _ => &[],
    }
}
