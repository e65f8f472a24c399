use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::Config;
use cooldown::{CooldownGate, JsonStateStore};
use marketdata::{BirdeyeClient, DexScreenerClient};
use pattern::{standard_engines, EngineParams};
use scanner::{discover, ScanCoordinator, ValuationBand, WatchEntry, WatchlistFile};
use telegram_alert::TelegramSink;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(
        interval_minutes = cfg.scan_interval_minutes,
        cooldown_hours = cfg.cooldown_hours,
        "EmaScan starting"
    );

    let params = match cfg.engine_params_path.as_deref() {
        Some(path) => {
            info!(path, "Loading engine params");
            EngineParams::load(path)
        }
        None => EngineParams::default(),
    };

    // ── Watchlist ─────────────────────────────────────────────────────────────
    let watchlist = WatchlistFile::load(&cfg.watchlist_path);
    info!(tokens = watchlist.tokens.len(), "Watchlist loaded");

    // ── Cooldown state ────────────────────────────────────────────────────────
    let store = JsonStateStore::new(&cfg.cooldown_state_path);
    let gate = CooldownGate::new(cfg.cooldown_hours, store.load());

    // ── Wiring ────────────────────────────────────────────────────────────────
    let source = Arc::new(BirdeyeClient::new(cfg.birdeye_api_key.clone()));
    let sink = Arc::new(TelegramSink::new(
        &cfg.telegram_token,
        cfg.telegram_chat_ids.clone(),
    ));
    let dexscreener = DexScreenerClient::new();

    // Watchlisted tokens were vetted by hand; the valuation band only
    // applies to discovered ones, so the coordinator runs without it.
    let mut coordinator = ScanCoordinator::new(
        source,
        sink,
        gate,
        store,
        standard_engines(&params),
        cfg.candle_limit,
        None,
        8,
    );

    // ── Scan loop ─────────────────────────────────────────────────────────────
    let mut interval =
        tokio::time::interval(Duration::from_secs(cfg.scan_interval_minutes * 60));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let mut entries: Vec<WatchEntry> = watchlist.tokens.clone();
                if cfg.discovery_enabled {
                    match discover(&dexscreener, &ValuationBand::default(), cfg.discovery_limit).await {
                        Ok(discovered) => {
                            info!(count = discovered.len(), "Discovered candidates");
                            for entry in discovered {
                                if !entries.iter().any(|e| e.key() == entry.key()) {
                                    entries.push(entry);
                                }
                            }
                        }
                        Err(e) => warn!(error = %e, "Token discovery failed, scanning watchlist only"),
                    }
                }
                coordinator.scan_cycle(&entries).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, exiting");
                break;
            }
        }
    }
}
