use anyhow::{Context, Result};
use live_odds::config::Config;
use live_odds::engine::sports::SportRegistry;
use live_odds::{InMemoryStore, LiveOddsEngine};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load saved settings from .env (real env vars take precedence)
    Config::load_env_file();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("live_odds=info")),
        )
        .init();

    let once = std::env::args().any(|arg| arg == "--once");

    let config_path = Config::config_path();
    let config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        tracing::warn!(path = %config_path.display(), "config file not found, using defaults");
        Config::default()
    };

    let registry = Arc::new(
        SportRegistry::with_overrides(&config.sports).context("invalid [sports] overrides")?,
    );
    tracing::info!(sports = registry.len(), "sport registry loaded");

    let state_path = config.state_path();
    if let Some(dir) = state_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
    }
    let store = Arc::new(
        InMemoryStore::load(&state_path)
            .await
            .with_context(|| format!("Failed to load state file: {}", state_path.display()))?,
    );

    let engine = LiveOddsEngine::new(store.clone(), store.clone(), registry)
        .with_tuning(config.poisson)
        .with_max_concurrency(config.engine.max_concurrency);

    let mut ticker = tokio::time::interval(Duration::from_secs(config.scheduler.interval_s.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let updated = engine.recalculate_all_live_odds().await;
                tracing::debug!(updated, "pass finished");
                if let Err(e) = store.save(&state_path).await {
                    tracing::error!(path = %state_path.display(), error = %e, "failed to save state");
                }
                if once {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("ctrl-c received");
                break;
            }
        }
    }

    store
        .save(&state_path)
        .await
        .with_context(|| format!("Failed to save state file: {}", state_path.display()))?;
    tracing::debug!("shutting down");
    Ok(())
}
