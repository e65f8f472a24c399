use std::sync::Arc;

use chrono::Utc;
use futures_util::{stream, StreamExt};
use tracing::{debug, info, warn};

use common::{validate_series, Alert, AlertSink, CandleSource};
use cooldown::{CooldownGate, JsonStateStore};
use pattern::PatternEngine;

use crate::discovery::ValuationBand;
use crate::watchlist::WatchEntry;

/// Runs one scan cycle end to end: cooldown filtering, concurrent pattern
/// evaluation, alert dispatch, and cooldown persistence.
///
/// Evaluation is pure and runs concurrently across instruments; everything
/// that mutates shared state (dispatch, cooldown marks, state file writes)
/// happens serially afterwards.
pub struct ScanCoordinator {
    source: Arc<dyn CandleSource>,
    sink: Arc<dyn AlertSink>,
    gate: CooldownGate,
    store: JsonStateStore,
    engines: Vec<Arc<dyn PatternEngine>>,
    candle_limit: usize,
    band: Option<ValuationBand>,
    concurrency: usize,
}

impl ScanCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Arc<dyn CandleSource>,
        sink: Arc<dyn AlertSink>,
        gate: CooldownGate,
        store: JsonStateStore,
        engines: Vec<Arc<dyn PatternEngine>>,
        candle_limit: usize,
        band: Option<ValuationBand>,
        concurrency: usize,
    ) -> Self {
        assert!(concurrency > 0, "concurrency must be positive");
        Self {
            source,
            sink,
            gate,
            store,
            engines,
            candle_limit,
            band,
            concurrency,
        }
    }

    /// Scan every entry once and return the alerts that were delivered.
    pub async fn scan_cycle(&mut self, entries: &[WatchEntry]) -> Vec<Alert> {
        self.scan_cycle_at(entries, Utc::now().timestamp()).await
    }

    /// Like [`scan_cycle`](Self::scan_cycle) with an injected clock.
    pub async fn scan_cycle_at(&mut self, entries: &[WatchEntry], now: i64) -> Vec<Alert> {
        let eligible: Vec<WatchEntry> = entries
            .iter()
            .filter(|entry| {
                let ok = self.gate.eligible(&entry.key(), now);
                if !ok {
                    debug!(token = %entry.key(), "In cooldown, skipping");
                }
                ok
            })
            .cloned()
            .collect();

        info!(
            total = entries.len(),
            eligible = eligible.len(),
            "Starting scan cycle"
        );

        let triggered: Vec<Alert> = stream::iter(eligible)
            .map(|entry| {
                let source = Arc::clone(&self.source);
                let engines = self.engines.clone();
                let band = self.band;
                let limit = self.candle_limit;
                async move { evaluate_entry(source, engines, band, limit, entry).await }
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|alert| async move { alert })
            .collect()
            .await;

        let mut delivered = Vec::new();
        for alert in triggered {
            match self.sink.deliver(&alert).await {
                Ok(()) => {
                    let key = format!("{}:{}", alert.chain, alert.address);
                    // Only a delivered alert starts the cooldown window;
                    // a failed send leaves the instrument eligible to retry.
                    self.gate.mark_alerted(&key, now);
                    info!(token = %key, pattern = %alert.pattern, "Alert delivered");
                    delivered.push(alert);
                }
                Err(e) => {
                    warn!(
                        token = format!("{}:{}", alert.chain, alert.address),
                        error = %e,
                        "Alert delivery failed, instrument stays eligible"
                    );
                }
            }
        }

        if !delivered.is_empty() {
            if let Err(e) = self.store.save(self.gate.snapshot()) {
                warn!(error = %e, "Failed to persist cooldown state");
            }
        }

        info!(delivered = delivered.len(), "Scan cycle finished");
        delivered
    }
}

/// Evaluate one instrument against the engine stack, first match wins.
///
/// Failures here never propagate: a broken fetch skips to the next engine,
/// a malformed series or failed snapshot skips the instrument. One bad
/// token must not take the cycle down.
async fn evaluate_entry(
    source: Arc<dyn CandleSource>,
    engines: Vec<Arc<dyn PatternEngine>>,
    band: Option<ValuationBand>,
    candle_limit: usize,
    entry: WatchEntry,
) -> Option<Alert> {
    let instrument = entry.instrument();

    let snapshot = match source.market_snapshot(&instrument).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(instrument = %instrument, error = %e, "Snapshot fetch failed, skipping");
            return None;
        }
    };
    if let Some(band) = band {
        if !band.accepts(&snapshot) {
            debug!(instrument = %instrument, "Outside valuation band, skipping");
            return None;
        }
    }

    for engine in &engines {
        if !entry.engines.contains(&engine.pattern()) {
            continue;
        }
        let mut candles = match source
            .candles(&instrument, engine.timeframe(), candle_limit)
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                warn!(
                    instrument = %instrument,
                    timeframe = %engine.timeframe(),
                    error = %e,
                    "Candle fetch failed, trying next engine"
                );
                continue;
            }
        };
        if let Err(e) = validate_series(&candles) {
            warn!(instrument = %instrument, error = %e, "Malformed series, skipping instrument");
            return None;
        }
        for candle in &mut candles {
            candle.market_cap = snapshot.market_cap;
        }

        let detection = engine.evaluate(&instrument, &candles);
        if let Some(alert) = detection.alert {
            info!(
                instrument = %instrument,
                pattern = %engine.pattern(),
                reason = %detection.reason,
                "Pattern triggered"
            );
            return Some(alert);
        }
        debug!(
            instrument = %instrument,
            pattern = %engine.pattern(),
            reason = %detection.reason,
            close = detection.last_close,
            ema = detection.last_ema,
            "No trigger"
        );
    }
    None
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use common::{
        Candle, Error, Instrument, MarketSnapshot, Pattern, Result, Timeframe,
    };
    use pattern::Detection;

    use super::*;

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle {
                timestamp: 1_700_000_000 + i as i64 * 3_600,
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 1.0,
                market_cap: None,
            })
            .collect()
    }

    fn entry(symbol: &str, address: &str) -> WatchEntry {
        WatchEntry {
            symbol: symbol.to_string(),
            chain: "solana".to_string(),
            address: address.to_string(),
            engines: vec![Pattern::A, Pattern::B, Pattern::C],
        }
    }

    fn temp_store(name: &str) -> JsonStateStore {
        let path: PathBuf = std::env::temp_dir().join(format!(
            "coordinator-{}-{}.json",
            name,
            std::process::id()
        ));
        std::fs::remove_file(&path).ok();
        JsonStateStore::new(path)
    }

    struct FixedSource {
        snapshot: MarketSnapshot,
        candle_calls: AtomicUsize,
        snapshot_calls: AtomicUsize,
        /// Addresses whose candle fetches fail.
        fail_candles_for: Vec<String>,
    }

    impl FixedSource {
        fn new(market_cap: Option<f64>) -> Self {
            Self {
                snapshot: MarketSnapshot {
                    price: 1.0,
                    market_cap,
                    liquidity: Some(50_000.0),
                },
                candle_calls: AtomicUsize::new(0),
                snapshot_calls: AtomicUsize::new(0),
                fail_candles_for: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl CandleSource for FixedSource {
        async fn candles(
            &self,
            instrument: &Instrument,
            _timeframe: Timeframe,
            limit: usize,
        ) -> Result<Vec<Candle>> {
            self.candle_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_candles_for.contains(&instrument.address) {
                return Err(Error::Http("connection reset".to_string()));
            }
            Ok(candles(limit))
        }

        async fn market_snapshot(&self, _instrument: &Instrument) -> Result<MarketSnapshot> {
            self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.snapshot.clone())
        }
    }

    struct ProbeEngine {
        pattern: Pattern,
        timeframe: Timeframe,
        triggers: bool,
        evaluations: AtomicUsize,
    }

    impl ProbeEngine {
        fn new(pattern: Pattern, timeframe: Timeframe, triggers: bool) -> Arc<Self> {
            Arc::new(Self {
                pattern,
                timeframe,
                triggers,
                evaluations: AtomicUsize::new(0),
            })
        }
    }

    impl PatternEngine for ProbeEngine {
        fn pattern(&self) -> Pattern {
            self.pattern
        }

        fn timeframe(&self) -> Timeframe {
            self.timeframe
        }

        fn evaluate(&self, instrument: &Instrument, candles: &[Candle]) -> Detection {
            self.evaluations.fetch_add(1, Ordering::SeqCst);
            if !self.triggers {
                return Detection {
                    alert: None,
                    reason: "no_trigger",
                    last_close: 1.0,
                    last_ema: 1.0,
                };
            }
            let last = candles.last().unwrap();
            Detection {
                alert: Some(Alert {
                    pattern: self.pattern,
                    chain: instrument.chain.clone(),
                    address: instrument.address.clone(),
                    symbol: instrument.symbol.clone(),
                    timeframe: self.timeframe,
                    price: last.close,
                    ema50: 1.0,
                    market_cap: last.market_cap,
                    reason: "probe".to_string(),
                    timestamp: last.timestamp,
                }),
                reason: "probe",
                last_close: last.close,
                last_ema: 1.0,
            }
        }
    }

    struct RecordingSink {
        delivered: Mutex<Vec<Alert>>,
        fail: bool,
    }

    impl RecordingSink {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                delivered: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn deliver(&self, alert: &Alert) -> Result<()> {
            if self.fail {
                return Err(Error::Delivery("all chats unreachable".to_string()));
            }
            self.delivered.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    fn coordinator(
        source: Arc<FixedSource>,
        sink: Arc<RecordingSink>,
        engines: Vec<Arc<dyn PatternEngine>>,
        seed: HashMap<String, i64>,
        store_name: &str,
    ) -> ScanCoordinator {
        ScanCoordinator::new(
            source,
            sink,
            CooldownGate::new(72, seed),
            temp_store(store_name),
            engines,
            100,
            None,
            4,
        )
    }

    #[tokio::test]
    async fn first_matching_engine_preempts_the_rest() {
        let source = Arc::new(FixedSource::new(Some(400_000.0)));
        let sink = RecordingSink::new(false);
        let engine_a = ProbeEngine::new(Pattern::A, Timeframe::H12, true);
        let engine_b = ProbeEngine::new(Pattern::B, Timeframe::H4, true);
        let engine_c = ProbeEngine::new(Pattern::C, Timeframe::H1, true);
        let mut coord = coordinator(
            Arc::clone(&source),
            Arc::clone(&sink),
            vec![engine_a.clone(), engine_b.clone(), engine_c.clone()],
            HashMap::new(),
            "first-match",
        );

        let delivered = coord.scan_cycle_at(&[entry("WIF", "addr1")], 1_800_000_000).await;

        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].pattern, Pattern::A);
        assert_eq!(engine_a.evaluations.load(Ordering::SeqCst), 1);
        assert_eq!(engine_b.evaluations.load(Ordering::SeqCst), 0);
        assert_eq!(engine_c.evaluations.load(Ordering::SeqCst), 0);
        assert_eq!(sink.delivered.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cooling_instruments_are_never_fetched() {
        let source = Arc::new(FixedSource::new(None));
        let sink = RecordingSink::new(false);
        let engine = ProbeEngine::new(Pattern::A, Timeframe::H12, true);
        let now = 1_800_000_000;
        let mut seed = HashMap::new();
        seed.insert("solana:addr1".to_string(), now - 3_600);
        let mut coord = coordinator(
            Arc::clone(&source),
            sink,
            vec![engine.clone()],
            seed,
            "cooling",
        );

        let delivered = coord.scan_cycle_at(&[entry("WIF", "addr1")], now).await;

        assert!(delivered.is_empty());
        assert_eq!(source.snapshot_calls.load(Ordering::SeqCst), 0);
        assert_eq!(source.candle_calls.load(Ordering::SeqCst), 0);
        assert_eq!(engine.evaluations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_delivery_leaves_instrument_eligible() {
        let source = Arc::new(FixedSource::new(None));
        let sink = RecordingSink::new(true);
        let engine = ProbeEngine::new(Pattern::A, Timeframe::H12, true);
        let mut coord = coordinator(source, sink, vec![engine], HashMap::new(), "failed-delivery");
        let now = 1_800_000_000;

        let delivered = coord.scan_cycle_at(&[entry("WIF", "addr1")], now).await;

        assert!(delivered.is_empty());
        assert!(coord.gate.eligible("solana:addr1", now));
    }

    #[tokio::test]
    async fn delivered_alert_starts_the_cooldown() {
        let source = Arc::new(FixedSource::new(None));
        let sink = RecordingSink::new(false);
        let engine = ProbeEngine::new(Pattern::A, Timeframe::H12, true);
        let mut coord = coordinator(source, sink, vec![engine], HashMap::new(), "cooldown-start");
        let now = 1_800_000_000;

        let delivered = coord.scan_cycle_at(&[entry("WIF", "addr1")], now).await;

        assert_eq!(delivered.len(), 1);
        assert!(!coord.gate.eligible("solana:addr1", now + 1));
        assert!(coord.gate.eligible("solana:addr1", now + 72 * 3_600));
        // Persisted state survives a restart.
        assert_eq!(
            coord.store.load().get("solana:addr1"),
            Some(&now)
        );
    }

    #[tokio::test]
    async fn one_broken_instrument_does_not_block_the_rest() {
        let mut source = FixedSource::new(None);
        source.fail_candles_for.push("bad".to_string());
        let source = Arc::new(source);
        let sink = RecordingSink::new(false);
        let engine = ProbeEngine::new(Pattern::A, Timeframe::H12, true);
        let mut coord = coordinator(
            source,
            Arc::clone(&sink),
            vec![engine],
            HashMap::new(),
            "isolation",
        );

        let delivered = coord
            .scan_cycle_at(&[entry("BAD", "bad"), entry("WIF", "good")], 1_800_000_000)
            .await;

        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].address, "good");
    }

    #[tokio::test]
    async fn snapshot_market_cap_is_attached_to_candles() {
        let source = Arc::new(FixedSource::new(Some(421_000.0)));
        let sink = RecordingSink::new(false);
        let engine = ProbeEngine::new(Pattern::C, Timeframe::H1, true);
        let mut coord = coordinator(source, sink, vec![engine], HashMap::new(), "snapshot-cap");

        let delivered = coord.scan_cycle_at(&[entry("WIF", "addr1")], 1_800_000_000).await;

        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].market_cap, Some(421_000.0));
    }

    #[tokio::test]
    async fn valuation_band_filters_before_evaluation() {
        let source = Arc::new(FixedSource::new(Some(50_000.0)));
        let sink = RecordingSink::new(false);
        let engine = ProbeEngine::new(Pattern::A, Timeframe::H12, true);
        let mut coord = ScanCoordinator::new(
            Arc::clone(&source) as Arc<dyn CandleSource>,
            sink,
            CooldownGate::new(72, HashMap::new()),
            temp_store("band"),
            vec![engine.clone()],
            100,
            Some(ValuationBand::default()),
            4,
        );

        let delivered = coord.scan_cycle_at(&[entry("WIF", "addr1")], 1_800_000_000).await;

        assert!(delivered.is_empty());
        assert_eq!(source.candle_calls.load(Ordering::SeqCst), 0);
        assert_eq!(engine.evaluations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn engine_subset_limits_evaluation() {
        let source = Arc::new(FixedSource::new(None));
        let sink = RecordingSink::new(false);
        let engine_a = ProbeEngine::new(Pattern::A, Timeframe::H12, false);
        let engine_b = ProbeEngine::new(Pattern::B, Timeframe::H4, false);
        let mut coord = coordinator(
            source,
            sink,
            vec![engine_a.clone(), engine_b.clone()],
            HashMap::new(),
            "subset",
        );
        let mut only_b = entry("WIF", "addr1");
        only_b.engines = vec![Pattern::B];

        coord.scan_cycle_at(&[only_b], 1_800_000_000).await;

        assert_eq!(engine_a.evaluations.load(Ordering::SeqCst), 0);
        assert_eq!(engine_b.evaluations.load(Ordering::SeqCst), 1);
    }
}
