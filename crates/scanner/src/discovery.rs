use tracing::{debug, warn};

use common::{MarketSnapshot, Pattern, Result};
use marketdata::DexScreenerClient;

use crate::watchlist::WatchEntry;

/// Valuation window a discovered token must sit inside before it is worth
/// scanning. Tokens below the cap floor are too easily manipulated; tokens
/// above the ceiling have already made their move.
#[derive(Debug, Clone, Copy)]
pub struct ValuationBand {
    pub min_market_cap: f64,
    pub max_market_cap: f64,
    pub min_liquidity: f64,
}

impl Default for ValuationBand {
    fn default() -> Self {
        Self {
            min_market_cap: 100_000.0,
            max_market_cap: 500_000.0,
            min_liquidity: 10_000.0,
        }
    }
}

impl ValuationBand {
    /// Missing market cap or liquidity counts as a rejection: an unknown
    /// valuation cannot be shown to sit inside the band.
    pub fn accepts(&self, snapshot: &MarketSnapshot) -> bool {
        let Some(market_cap) = snapshot.market_cap else {
            return false;
        };
        let Some(liquidity) = snapshot.liquidity else {
            return false;
        };
        market_cap >= self.min_market_cap
            && market_cap <= self.max_market_cap
            && liquidity >= self.min_liquidity
    }
}

/// Pull the latest boosted tokens, keep the ones inside the valuation band,
/// and return them as watch entries ordered by 24h volume, busiest first.
pub async fn discover(
    client: &DexScreenerClient,
    band: &ValuationBand,
    limit: usize,
) -> Result<Vec<WatchEntry>> {
    let boosted = client.boosted_tokens().await?;
    let mut candidates: Vec<(WatchEntry, f64)> = Vec::new();

    for token in boosted {
        let pairs = match client.token_pairs(&token.chain_id, &token.token_address).await {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!(
                    chain = %token.chain_id,
                    address = %token.token_address,
                    error = %e,
                    "Pair lookup failed, skipping candidate"
                );
                continue;
            }
        };
        // A token can trade on several pools; judge it by its deepest one.
        let Some(pair) = pairs
            .into_iter()
            .max_by(|a, b| a.liquidity_usd().total_cmp(&b.liquidity_usd()))
        else {
            continue;
        };

        let snapshot = MarketSnapshot {
            price: pair.price(),
            market_cap: pair.market_cap,
            liquidity: Some(pair.liquidity_usd()),
        };
        if !band.accepts(&snapshot) {
            debug!(
                chain = %token.chain_id,
                address = %token.token_address,
                market_cap = ?snapshot.market_cap,
                "Candidate outside valuation band"
            );
            continue;
        }
        if candidates
            .iter()
            .any(|(entry, _)| entry.chain == token.chain_id && entry.address == token.token_address)
        {
            continue;
        }

        let entry = WatchEntry {
            symbol: pair.base_token.symbol.clone(),
            chain: token.chain_id,
            address: token.token_address,
            engines: vec![Pattern::A, Pattern::B, Pattern::C],
        };
        candidates.push((entry, pair.volume_24h()));
    }

    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.truncate(limit);
    Ok(candidates.into_iter().map(|(entry, _)| entry).collect())
}
