use serde::Deserialize;

use common::{Instrument, Pattern};

/// Top-level watchlist file (TOML).
///
/// Example `config/watchlist.toml`:
/// ```toml
/// [[token]]
/// symbol = "WIF"
/// chain = "solana"
/// address = "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm"
///
/// [[token]]
/// symbol = "TOSHI"
/// chain = "base"
/// address = "0xAC1Bd2486aAf3B5C0fc3Fd868558b082a531B2B4"
/// engines = ["B", "C"]
/// ```
///
/// When `engines` is omitted the token is evaluated by all three engines.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistFile {
    #[serde(rename = "token")]
    pub tokens: Vec<WatchEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchEntry {
    /// Display symbol shown in alerts, e.g. "WIF".
    pub symbol: String,
    /// Chain identifier, e.g. "solana" or "base".
    pub chain: String,
    /// Token contract address on that chain.
    pub address: String,
    /// Engines allowed to evaluate this token.
    #[serde(default = "all_engines")]
    pub engines: Vec<Pattern>,
}

fn all_engines() -> Vec<Pattern> {
    vec![Pattern::A, Pattern::B, Pattern::C]
}

impl WatchEntry {
    pub fn instrument(&self) -> Instrument {
        Instrument {
            symbol: self.symbol.clone(),
            chain: self.chain.clone(),
            address: self.address.clone(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}:{}", self.chain, self.address)
    }
}

impl WatchlistFile {
    /// Load from a TOML file. Exits process on error.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read watchlist at '{path}': {e}"));
        toml::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse watchlist at '{path}': {e}"))
    }
}
