use serde_json::Value;

/// Provider-specific live metadata. Shape varies by feed, so it stays a
/// dynamic key/value bag and extraction is done per rule.
pub type MetadataMap = serde_json::Map<String, Value>;

/// A JSON number under `key`. Strings are not coerced.
pub fn number(meta: &MetadataMap, key: &str) -> Option<f64> {
    meta.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

/// A JSON number under `outer.key`, e.g. `timer.tm`.
pub fn nested_number(meta: &MetadataMap, outer: &str, key: &str) -> Option<f64> {
    meta.get(outer)?
        .as_object()
        .and_then(|inner| number(inner, key))
}

/// A non-empty string under `key`.
pub fn text<'a>(meta: &'a MetadataMap, key: &str) -> Option<&'a str> {
    meta.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse an elapsed clock string into minutes.
///
/// Accepts `"7"`, `"7'"`, `"7.5"`, `"45+2"` (stoppage) and `"07:30"` (mm:ss).
pub fn parse_elapsed_text(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_end_matches('\'').trim();
    if s.is_empty() {
        return None;
    }
    if let Some((min_str, sec_str)) = s.split_once(':') {
        let minutes: f64 = min_str.trim().parse().ok()?;
        let seconds: f64 = sec_str.split('.').next()?.trim().parse().ok()?;
        return Some(minutes + seconds / 60.0).filter(|v| v.is_finite());
    }
    if let Some((base, extra)) = s.split_once('+') {
        let base: f64 = base.trim().parse().ok()?;
        let extra: f64 = extra.trim().parse().ok()?;
        return Some(base + extra).filter(|v| v.is_finite());
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(v: Value) -> MetadataMap {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_number_ignores_strings() {
        let m = meta(json!({"elapsed": "12", "minute": 12}));
        assert_eq!(number(&m, "elapsed"), None);
        assert_eq!(number(&m, "minute"), Some(12.0));
    }

    #[test]
    fn test_nested_number() {
        let m = meta(json!({"timer": {"tm": 63, "ts": 30}}));
        assert_eq!(nested_number(&m, "timer", "tm"), Some(63.0));
        assert_eq!(nested_number(&m, "timer", "missing"), None);
        assert_eq!(nested_number(&m, "nope", "tm"), None);
    }

    #[test]
    fn test_text_trims_and_rejects_empty() {
        let m = meta(json!({"period": " 2H ", "status": ""}));
        assert_eq!(text(&m, "period"), Some("2H"));
        assert_eq!(text(&m, "status"), None);
    }

    #[test]
    fn test_parse_elapsed_formats() {
        assert_eq!(parse_elapsed_text("7"), Some(7.0));
        assert_eq!(parse_elapsed_text("7'"), Some(7.0));
        assert_eq!(parse_elapsed_text("45+2"), Some(47.0));
        assert_eq!(parse_elapsed_text("07:30"), Some(7.5));
        assert_eq!(parse_elapsed_text("0:05.3"), Some(5.0 / 60.0));
        assert_eq!(parse_elapsed_text(""), None);
        assert_eq!(parse_elapsed_text("HT"), None);
        assert_eq!(parse_elapsed_text("nan:00"), None);
        assert_eq!(parse_elapsed_text("inf:00"), None);
        assert_eq!(parse_elapsed_text("45+inf"), None);
        assert_eq!(parse_elapsed_text("NaN"), None);
    }
}
