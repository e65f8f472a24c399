pub mod ema;
pub mod engines;
pub mod params;

pub use ema::ema;
pub use engines::{EngineA, EngineB, EngineC};
pub use params::EngineParams;

use common::{Alert, Candle, Instrument, Pattern, Timeframe};

/// Outcome of one engine evaluation.
///
/// Engines are total over well-formed input: "no trigger" is a normal
/// result carrying a diagnostic reason, never an error. The last
/// close/EMA pair is included for diagnostics (zeroed when the series was
/// too short to compute an EMA at all).
#[derive(Debug, Clone)]
pub struct Detection {
    pub alert: Option<Alert>,
    pub reason: &'static str,
    pub last_close: f64,
    pub last_ema: f64,
}

impl Detection {
    pub(crate) fn insufficient() -> Self {
        Self {
            alert: None,
            reason: "not_enough_candles",
            last_close: 0.0,
            last_ema: 0.0,
        }
    }

    pub(crate) fn silent(reason: &'static str, last_close: f64, last_ema: f64) -> Self {
        Self {
            alert: None,
            reason,
            last_close,
            last_ema,
        }
    }

    pub(crate) fn triggered(reason: &'static str, alert: Alert) -> Self {
        let last_close = alert.price;
        let last_ema = alert.ema50;
        Self {
            alert: Some(alert),
            reason,
            last_close,
            last_ema,
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.alert.is_some()
    }
}

/// All pattern engines must satisfy this trait.
pub trait PatternEngine: Send + Sync {
    /// Which pattern slot this engine fills (also its priority rank).
    fn pattern(&self) -> Pattern;

    /// Candle timeframe this engine evaluates.
    fn timeframe(&self) -> Timeframe;

    /// Evaluate one instrument's candle series. Candles are sorted
    /// ascending by timestamp and validated before this is called.
    fn evaluate(&self, instrument: &Instrument, candles: &[Candle]) -> Detection;
}

/// Build the standard engine stack in dispatch priority order: the slow,
/// reliable 12h reclaim preempts the 4h reclaim-after-dump, which preempts
/// the fast 1h hold. The coordinator stops at the first match.
pub fn standard_engines(params: &EngineParams) -> Vec<std::sync::Arc<dyn PatternEngine>> {
    vec![
        std::sync::Arc::new(EngineA::new(params.clone())),
        std::sync::Arc::new(EngineB::new(params.clone())),
        std::sync::Arc::new(EngineC::new(params.clone())),
    ]
}
