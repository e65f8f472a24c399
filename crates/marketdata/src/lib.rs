pub mod birdeye;
pub mod dexscreener;

pub use birdeye::BirdeyeClient;
pub use dexscreener::{BoostedToken, DexScreenerClient, PairInfo};
