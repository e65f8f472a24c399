use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{Error, Result};

const BOOSTS_URL: &str = "https://api.dexscreener.com/token-boosts/latest/v1";
const TOKENS_URL: &str = "https://api.dexscreener.com/tokens/v1";

/// REST client for the DexScreener API, used to source candidate tokens
/// that are not on the static watchlist.
pub struct DexScreenerClient {
    http: Client,
}

impl Default for DexScreenerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DexScreenerClient {
    pub fn new() -> Self {
        Self {
            http: Client::builder()
                .use_rustls_tls()
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    async fn get(&self, url: &str) -> Result<String> {
        let resp = self
            .http
            .get(url)
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

    /// Latest boosted tokens across all chains.
    pub async fn boosted_tokens(&self) -> Result<Vec<BoostedToken>> {
        let body = self.get(BOOSTS_URL).await?;
        let tokens = parse_boosted(&body)?;
        debug!(count = tokens.len(), "Fetched boosted tokens");
        Ok(tokens)
    }

    /// All known trading pairs for a token, richest pair first is NOT
    /// guaranteed by the provider; callers pick the pair they want.
    pub async fn token_pairs(&self, chain: &str, address: &str) -> Result<Vec<PairInfo>> {
        let body = self.get(&format!("{TOKENS_URL}/{chain}/{address}")).await?;
        parse_pairs(&body)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoostedToken {
    #[serde(rename = "chainId")]
    pub chain_id: String,
    #[serde(rename = "tokenAddress")]
    pub token_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairInfo {
    #[serde(rename = "baseToken")]
    pub base_token: BaseToken,
    #[serde(rename = "priceUsd", default)]
    pub price_usd: Option<String>,
    #[serde(rename = "marketCap", default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub liquidity: Option<Liquidity>,
    #[serde(default)]
    pub volume: Option<Volume>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseToken {
    pub address: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Liquidity {
    #[serde(default)]
    pub usd: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Volume {
    #[serde(default)]
    pub h24: f64,
}

impl PairInfo {
    pub fn price(&self) -> f64 {
        self.price_usd
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or(0.0)
    }

    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().map(|l| l.usd).unwrap_or(0.0)
    }

    pub fn volume_24h(&self) -> f64 {
        self.volume.as_ref().map(|v| v.h24).unwrap_or(0.0)
    }
}

fn parse_boosted(body: &str) -> Result<Vec<BoostedToken>> {
    Ok(serde_json::from_str(body)?)
}

fn parse_pairs(body: &str) -> Result<Vec<PairInfo>> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_boosted_feed() {
        let body = r#"[
            {"chainId": "solana", "tokenAddress": "So11111111111111111111111111111111111111112", "amount": 50},
            {"chainId": "base", "tokenAddress": "0xabc", "amount": 10}
        ]"#;
        let tokens = parse_boosted(body).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].chain_id, "solana");
        assert_eq!(tokens[1].token_address, "0xabc");
    }

    #[test]
    fn parses_pair_with_full_fields() {
        let body = r#"[{
            "chainId": "solana",
            "baseToken": {"address": "abc123", "name": "Example", "symbol": "EXM"},
            "priceUsd": "0.004215",
            "marketCap": 421500.0,
            "liquidity": {"usd": 98000.5, "base": 1.0, "quote": 2.0},
            "volume": {"h24": 1250000.0, "h6": 40000.0}
        }]"#;
        let pairs = parse_pairs(body).unwrap();
        assert_eq!(pairs.len(), 1);
        let pair = &pairs[0];
        assert_eq!(pair.base_token.symbol, "EXM");
        assert!((pair.price() - 0.004215).abs() < 1e-12);
        assert_eq!(pair.market_cap, Some(421_500.0));
        assert!((pair.liquidity_usd() - 98_000.5).abs() < 1e-9);
        assert!((pair.volume_24h() - 1_250_000.0).abs() < 1e-9);
    }

    #[test]
    fn missing_optional_fields_default_to_zero() {
        let body = r#"[{"baseToken": {"address": "abc", "symbol": "X"}}]"#;
        let pairs = parse_pairs(body).unwrap();
        let pair = &pairs[0];
        assert_eq!(pair.price(), 0.0);
        assert_eq!(pair.liquidity_usd(), 0.0);
        assert_eq!(pair.volume_24h(), 0.0);
        assert!(pair.market_cap.is_none());
    }
}
