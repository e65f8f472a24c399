use common::{Alert, Candle, Instrument, Pattern, Timeframe};

use crate::ema::ema;
use crate::params::EngineParams;
use crate::{Detection, PatternEngine};

const TRIGGER_REASON: &str = "4H close reclaimed EMA50 after dump";

/// Minimum series length before the 20-bar scan window is meaningful.
const MIN_CANDLES: usize = 60;
/// Candidate crossings are searched within the last `SCAN_WINDOW` bars,
/// excluding the very last bar.
const SCAN_WINDOW: usize = 20;
/// Bars of history inspected for the prior peak before a crossing.
const DUMP_LOOKBACK: usize = 40;

/// Engine B — pump → dump → reclaim.
///
/// Scans the last 20 bars (oldest first, final bar excluded) for an
/// upward EMA50 crossing preceded by a meaningful decline: the maximum
/// close in the 40 bars before the crossing must exceed the reclaim close
/// by `dump_threshold`. The earliest qualifying crossing wins. Indices
/// inside the EMA seed window are skipped — the padded prefix is a
/// constant, not a real EMA, and a crossing against it is meaningless.
#[derive(Debug, Clone)]
pub struct EngineB {
    params: EngineParams,
}

impl EngineB {
    pub fn new(params: EngineParams) -> Self {
        Self { params }
    }
}

impl PatternEngine for EngineB {
    fn pattern(&self) -> Pattern {
        Pattern::B
    }

    fn timeframe(&self) -> Timeframe {
        Timeframe::H4
    }

    fn evaluate(&self, instrument: &Instrument, candles: &[Candle]) -> Detection {
        if candles.len() < MIN_CANDLES {
            return Detection::insufficient();
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let ema_series = ema(&closes, self.params.ema_length);
        let len = closes.len();

        // Oldest-to-newest over len-20 ..= len-2: the earliest qualifying
        // crossing in the window is the one reported.
        for idx in len - SCAN_WINDOW..len - 1 {
            if idx < self.params.ema_length {
                continue;
            }

            let crossed =
                closes[idx] > ema_series[idx] && closes[idx - 1] <= ema_series[idx - 1];
            if !crossed {
                continue;
            }

            let lookback = idx.min(DUMP_LOOKBACK);
            let peak_before = closes[idx - lookback..idx]
                .iter()
                .cloned()
                .fold(f64::MIN, f64::max);
            if peak_before > closes[idx] * self.params.dump_threshold {
                return Detection::triggered(
                    TRIGGER_REASON,
                    Alert {
                        pattern: Pattern::B,
                        chain: instrument.chain.clone(),
                        address: instrument.address.clone(),
                        symbol: instrument.symbol.clone(),
                        timeframe: Timeframe::H4,
                        price: closes[idx],
                        ema50: ema_series[idx],
                        market_cap: candles[idx].market_cap,
                        reason: TRIGGER_REASON.to_string(),
                        timestamp: candles[idx].timestamp,
                    },
                );
            }
        }

        Detection::silent("no_reclaim", closes[len - 1], ema_series[len - 1])
    }
}
