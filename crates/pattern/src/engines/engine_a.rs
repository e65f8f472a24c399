use common::{Alert, Candle, Instrument, Pattern, Timeframe};

use crate::ema::ema;
use crate::params::EngineParams;
use crate::{Detection, PatternEngine};

const TRIGGER_REASON: &str = "12h close reclaimed EMA50";

/// Engine A — slow reclaim.
///
/// Fires when the final 12h candle closes strictly above its EMA50 while
/// the previous candle closed at or below its EMA50. Only the last two
/// bars are examined; no lookback beyond them.
#[derive(Debug, Clone)]
pub struct EngineA {
    params: EngineParams,
}

impl EngineA {
    pub fn new(params: EngineParams) -> Self {
        Self { params }
    }
}

impl PatternEngine for EngineA {
    fn pattern(&self) -> Pattern {
        Pattern::A
    }

    fn timeframe(&self) -> Timeframe {
        Timeframe::H12
    }

    fn evaluate(&self, instrument: &Instrument, candles: &[Candle]) -> Detection {
        if candles.len() < self.params.ema_length + 2 {
            return Detection::insufficient();
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let ema_series = ema(&closes, self.params.ema_length);

        let last = &candles[candles.len() - 1];
        let prev = &candles[candles.len() - 2];
        let last_ema = ema_series[ema_series.len() - 1];
        let prev_ema = ema_series[ema_series.len() - 2];

        let reclaimed = last.close > last_ema && prev.close <= prev_ema;
        if !reclaimed {
            return Detection::silent("no_reclaim", last.close, last_ema);
        }

        Detection::triggered(
            TRIGGER_REASON,
            Alert {
                pattern: Pattern::A,
                chain: instrument.chain.clone(),
                address: instrument.address.clone(),
                symbol: instrument.symbol.clone(),
                timeframe: Timeframe::H12,
                price: last.close,
                ema50: last_ema,
                market_cap: last.market_cap,
                reason: TRIGGER_REASON.to_string(),
                timestamp: last.timestamp,
            },
        )
    }
}
