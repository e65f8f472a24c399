use serde::{Deserialize, Serialize};

/// Tunable thresholds shared by the three pattern engines.
///
/// Every heuristic constant lives here so the engines carry no magic
/// numbers. Defaults reproduce the production values; individual fields
/// can be overridden from TOML:
///
/// ```toml
/// dump_threshold = 1.25
/// mc_floor = 250000.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// EMA span used by all engines.
    pub ema_length: usize,
    /// Engine B: local peak must exceed the reclaim close by this factor
    /// (1.20 ≈ a prior ~17% decline from the peak).
    pub dump_threshold: f64,
    /// Engine C: maximum relative distance from the EMA that still counts
    /// as "holding" (0.02 = within 2%).
    pub hold_band: f64,
    /// Engine C: minimum rise within the pump sub-window (1.30 = +30%).
    pub pump_threshold: f64,
    /// Engine C: minimum market capitalization for an alert to be emitted.
    pub mc_floor: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            ema_length: 50,
            dump_threshold: 1.20,
            hold_band: 0.02,
            pump_threshold: 1.30,
            mc_floor: 300_000.0,
        }
    }
}

impl EngineParams {
    /// Load overrides from a TOML file. Exits process on error.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read engine params at '{path}': {e}"));
        toml::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse engine params at '{path}': {e}"))
    }
}
