use crate::engine::poisson::PoissonTuning;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";
const DEFAULT_CONFIG_PATH: &str = "config.toml";
const CONFIG_PATH_VAR: &str = "LIVE_ODDS_CONFIG";
const STATE_PATH_VAR: &str = "LIVE_ODDS_STATE";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub poisson: PoissonTuning,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Per-sport parameter overrides, keyed by sport slug.
    #[serde(default)]
    pub sports: HashMap<String, SportOverride>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize { 8 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_s")]
    pub interval_s: u64,
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

fn default_interval_s() -> u64 { 10 }
fn default_state_path() -> PathBuf { PathBuf::from("data/live_state.json") }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_s: default_interval_s(),
            state_path: default_state_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SportOverride {
    pub total_time_minutes: Option<f64>,
    pub avg_rate_home: Option<f64>,
    pub avg_rate_away: Option<f64>,
    pub live_margin: Option<f64>,
    pub score_std_dev_per_minute: Option<f64>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// `LIVE_ODDS_CONFIG` or `config.toml`.
    pub fn config_path() -> PathBuf {
        match std::env::var(CONFIG_PATH_VAR) {
            Ok(p) if !p.trim().is_empty() => PathBuf::from(sanitize_value(&p)),
            _ => PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// `LIVE_ODDS_STATE` takes precedence over `scheduler.state_path`.
    pub fn state_path(&self) -> PathBuf {
        match std::env::var(STATE_PATH_VAR) {
            Ok(p) if !p.trim().is_empty() => PathBuf::from(sanitize_value(&p)),
            _ => self.scheduler.state_path.clone(),
        }
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            if let Some((key, value)) = parse_env_line(line) {
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }
}

/// `KEY=VALUE` with optional quotes; blank lines and `#` comments yield None.
fn parse_env_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim().trim_matches('\r');
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim().trim_matches('"').trim_matches('\'')))
}

/// Strip carriage returns, BOM, and other invisible chars from a path value.
fn sanitize_value(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.engine.max_concurrency, 8);
        assert_eq!(config.poisson.low_cutoff, 8);
        assert_eq!(config.poisson.high_cutoff, 15);
        assert_eq!(config.scheduler.interval_s, 10);
        assert!(config.sports.contains_key("football"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.engine.max_concurrency, 8);
        assert_eq!(config.poisson, PoissonTuning::default());
        assert_eq!(config.scheduler.state_path, PathBuf::from("data/live_state.json"));
        assert!(config.sports.is_empty());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [poisson]
            prune_threshold = 1e-10

            [sports.basketball]
            live_margin = 1.04
            "#,
        )
        .unwrap();
        assert_eq!(config.poisson.prune_threshold, 1e-10);
        assert_eq!(config.poisson.low_cutoff, 8);
        assert_eq!(config.sports["basketball"].live_margin, Some(1.04));
        assert_eq!(config.sports["basketball"].avg_rate_home, None);
    }

    #[test]
    fn test_bad_toml_is_error() {
        assert!(Config::parse("[engine\nmax_concurrency = ").is_err());
    }

    #[test]
    fn test_mistyped_sport_key_is_error() {
        let err = Config::parse("[sports.football]\navg_rate_hom = 1.5\n").unwrap_err();
        assert!(format!("{err:#}").contains("avg_rate_hom"), "{err:#}");
    }

    #[test]
    fn test_nan_override_reaches_validation() {
        let config = Config::parse("[sports.football]\navg_rate_home = nan\n").unwrap();
        assert!(config.sports["football"].avg_rate_home.unwrap().is_nan());
        assert!(crate::engine::sports::SportRegistry::with_overrides(&config.sports).is_err());
    }

    #[test]
    fn test_parse_env_line() {
        assert_eq!(parse_env_line("LIVE_ODDS_STATE=/tmp/x.json"), Some(("LIVE_ODDS_STATE", "/tmp/x.json")));
        assert_eq!(parse_env_line("  KEY = \"quoted\" \r"), Some(("KEY", "quoted")));
        assert_eq!(parse_env_line("# comment"), None);
        assert_eq!(parse_env_line(""), None);
        assert_eq!(parse_env_line("novalue"), None);
    }

    #[test]
    fn test_sanitize_value() {
        assert_eq!(sanitize_value("\u{feff}/data/state.json\r\n"), "/data/state.json");
    }
}
