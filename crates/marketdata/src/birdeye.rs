use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{
    Candle, CandleSource, Error, Instrument, MarketSnapshot, Result, Timeframe,
};

const BASE_URL: &str = "https://public-api.birdeye.so";

/// REST client for the Birdeye API. Supplies historical OHLCV candles and
/// the current market snapshot (price, market cap, liquidity).
pub struct BirdeyeClient {
    api_key: String,
    http: Client,
}

impl BirdeyeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: Client::builder()
                .use_rustls_tls()
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let resp = self
            .http
            .get(format!("{BASE_URL}{path}"))
            .query(query)
            .header("X-API-KEY", &self.api_key)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Api(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl CandleSource for BirdeyeClient {
    async fn candles(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let now = Utc::now().timestamp();
        let time_from = now - limit as i64 * timeframe.seconds();

        let query = [
            ("address", instrument.address.clone()),
            ("type", timeframe.provider_code().to_string()),
            ("time_from", time_from.to_string()),
            ("time_to", now.to_string()),
        ];
        let body = self.get("/defi/ohlcv", &query).await?;
        let candles = parse_ohlcv(&body)?;
        debug!(
            instrument = %instrument,
            timeframe = %timeframe,
            count = candles.len(),
            "Fetched candles"
        );
        Ok(candles)
    }

    async fn market_snapshot(&self, instrument: &Instrument) -> Result<MarketSnapshot> {
        let query = [
            ("chain", instrument.chain.clone()),
            ("address", instrument.address.clone()),
        ];
        let body = self.get("/defi/v3/token/market-data", &query).await?;
        parse_market_data(&body)
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(Error::Api(
                self.message.unwrap_or_else(|| "unknown provider error".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| Error::Api("missing data in provider response".to_string()))
    }
}

#[derive(Deserialize)]
struct OhlcvData {
    #[serde(default)]
    items: Vec<OhlcvItem>,
}

#[derive(Deserialize)]
struct OhlcvItem {
    #[serde(rename = "unixTime")]
    unix_time: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

#[derive(Deserialize)]
struct MarketData {
    #[serde(default)]
    price: f64,
    #[serde(default, alias = "marketCap", alias = "mc")]
    market_cap: Option<f64>,
    #[serde(default)]
    liquidity: Option<f64>,
}

/// Parse an OHLCV response body into candles sorted ascending by timestamp.
fn parse_ohlcv(body: &str) -> Result<Vec<Candle>> {
    let envelope: Envelope<OhlcvData> = serde_json::from_str(body)?;
    let mut candles: Vec<Candle> = envelope
        .into_data()?
        .items
        .into_iter()
        .map(|item| Candle {
            timestamp: item.unix_time,
            open: item.o,
            high: item.h,
            low: item.l,
            close: item.c,
            volume: item.v,
            market_cap: None,
        })
        .collect();
    // The provider usually returns ascending order, but the core's contract
    // requires it, so enforce rather than assume.
    candles.sort_by_key(|c| c.timestamp);
    Ok(candles)
}

fn parse_market_data(body: &str) -> Result<MarketSnapshot> {
    let envelope: Envelope<MarketData> = serde_json::from_str(body)?;
    let data = envelope.into_data()?;
    Ok(MarketSnapshot {
        price: data.price,
        market_cap: data.market_cap,
        liquidity: data.liquidity,
    })
}
