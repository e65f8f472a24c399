use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One OHLCV bar as returned by the candle source.
///
/// `market_cap` is not part of the provider's candle payload; the scan
/// coordinator attaches the current market capitalization before Engine C
/// runs (the valuation gate reads it from the final candle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time, unix seconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub market_cap: Option<f64>,
}

/// A tradeable token identified by `(chain, address)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub chain: String,
    pub address: String,
}

impl Instrument {
    /// Canonical cooldown-state key, `"chain:address"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.chain, self.address)
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.symbol, self.key())
    }
}

/// Candle timeframe understood by the pattern engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    H1,
    H4,
    H12,
}

impl Timeframe {
    /// Identifier used in the candle provider's API (`type` parameter).
    pub fn provider_code(&self) -> &'static str {
        match self {
            Timeframe::H1 => "1H",
            Timeframe::H4 => "4H",
            Timeframe::H12 => "12H",
        }
    }

    /// Bar duration in seconds, used to compute the fetch window.
    pub fn seconds(&self) -> i64 {
        match self {
            Timeframe::H1 => 3_600,
            Timeframe::H4 => 14_400,
            Timeframe::H12 => 43_200,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::H1 => write!(f, "1h"),
            Timeframe::H4 => write!(f, "4h"),
            Timeframe::H12 => write!(f, "12h"),
        }
    }
}

/// The three detection strategies, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    #[serde(alias = "a")]
    A,
    #[serde(alias = "b")]
    B,
    #[serde(alias = "c")]
    C,
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pattern::A => write!(f, "A"),
            Pattern::B => write!(f, "B"),
            Pattern::C => write!(f, "C"),
        }
    }
}

/// A successful detection, handed to the dispatch sink and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub pattern: Pattern,
    pub chain: String,
    pub address: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Close price of the triggering candle.
    pub price: f64,
    /// EMA50 value aligned with the triggering candle.
    pub ema50: f64,
    pub market_cap: Option<f64>,
    pub reason: String,
    /// Timestamp of the triggering candle, unix seconds.
    pub timestamp: i64,
}

/// Current market data for one instrument, fetched once per scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub price: f64,
    pub market_cap: Option<f64>,
    pub liquidity: Option<f64>,
}

/// Check the candle-series invariants: strictly increasing timestamps and
/// finite, non-negative price/volume fields.
///
/// A violation is a hard error — silently miscomputing a signal on corrupt
/// data is worse than skipping the instrument.
pub fn validate_series(candles: &[Candle]) -> Result<()> {
    for (i, c) in candles.iter().enumerate() {
        let fields = [c.open, c.high, c.low, c.close, c.volume];
        if fields.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::MalformedSeries(format!(
                "non-finite or negative field in candle at index {i} (ts {})",
                c.timestamp
            )));
        }
        if i > 0 && c.timestamp <= candles[i - 1].timestamp {
            return Err(Error::MalformedSeries(format!(
                "timestamps not strictly increasing at index {i}: {} <= {}",
                c.timestamp,
                candles[i - 1].timestamp
            )));
        }
    }
    Ok(())
}
