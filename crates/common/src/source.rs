use async_trait::async_trait;

use crate::{Candle, Instrument, MarketSnapshot, Result, Timeframe};

/// Abstraction over the market-data provider.
///
/// `BirdeyeClient` in `crates/marketdata` implements this for production.
/// Implementations must return candles sorted ascending by timestamp;
/// the scan coordinator treats an empty or short series as insufficient
/// data, never as an error.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch up to `limit` most recent candles for one instrument/timeframe.
    async fn candles(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>>;

    /// Fetch the current price, market cap, and liquidity for one instrument.
    async fn market_snapshot(&self, instrument: &Instrument) -> Result<MarketSnapshot>;
}
