use common::{Alert, Candle, Instrument, Pattern, Timeframe};

use crate::ema::ema;
use crate::params::EngineParams;
use crate::{Detection, PatternEngine};

const TRIGGER_REASON: &str = "1H EMA50 hold after pump";

const MIN_CANDLES: usize = 80;
/// The pump and hold checks operate on the last `RECENT_WINDOW` closes.
const RECENT_WINDOW: usize = 20;
/// Pump start = minimum of the first `PUMP_START_BARS` recent closes.
const PUMP_START_BARS: usize = 5;
/// Pump end = maximum of the first `PUMP_END_BARS` recent closes.
const PUMP_END_BARS: usize = 15;

/// Engine C — fast hold after pump, valuation-gated.
///
/// Within the last 20 closes: recognizes a pump when the max of the first
/// 15 exceeds the min of the first 5 by `pump_threshold`, then requires
/// the final bar to sit within `hold_band` of its EMA50 and above the
/// close three bars prior.
///
/// The market-cap floor is applied after pattern evaluation: a match below
/// `mc_floor` produces no alert but the pattern computation still runs in
/// full. Market cap is read from the final candle, where the coordinator
/// attaches the current snapshot value.
#[derive(Debug, Clone)]
pub struct EngineC {
    params: EngineParams,
}

impl EngineC {
    pub fn new(params: EngineParams) -> Self {
        Self { params }
    }
}

impl PatternEngine for EngineC {
    fn pattern(&self) -> Pattern {
        Pattern::C
    }

    fn timeframe(&self) -> Timeframe {
        Timeframe::H1
    }

    fn evaluate(&self, instrument: &Instrument, candles: &[Candle]) -> Detection {
        if candles.len() < MIN_CANDLES {
            return Detection::insufficient();
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let ema_series = ema(&closes, self.params.ema_length);
        let len = closes.len();

        let recent = &closes[len - RECENT_WINDOW..];
        let last_close = closes[len - 1];
        let last_ema = ema_series[len - 1];

        let pump_start = recent[..PUMP_START_BARS]
            .iter()
            .cloned()
            .fold(f64::MAX, f64::min);
        let pump_end = recent[..PUMP_END_BARS]
            .iter()
            .cloned()
            .fold(f64::MIN, f64::max);
        if pump_end <= pump_start * self.params.pump_threshold {
            return Detection::silent("no_pump", last_close, last_ema);
        }

        let near_ema = ((last_close - last_ema) / last_ema).abs() < self.params.hold_band;
        let bounced = last_close > recent[RECENT_WINDOW - 3];
        if !(near_ema && bounced) {
            return Detection::silent("no_ema_hold", last_close, last_ema);
        }

        // Valuation gate: blocks emission only, never the computation above.
        let market_cap = candles[len - 1].market_cap;
        if market_cap.unwrap_or(0.0) < self.params.mc_floor {
            return Detection::silent("below_valuation_floor", last_close, last_ema);
        }

        Detection::triggered(
            TRIGGER_REASON,
            Alert {
                pattern: Pattern::C,
                chain: instrument.chain.clone(),
                address: instrument.address.clone(),
                symbol: instrument.symbol.clone(),
                timeframe: Timeframe::H1,
                price: last_close,
                ema50: last_ema,
                market_cap,
                reason: TRIGGER_REASON.to_string(),
                timestamp: candles[len - 1].timestamp,
            },
        )
    }
}
