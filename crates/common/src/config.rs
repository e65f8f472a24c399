/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Market data
    pub birdeye_api_key: String,

    // Telegram
    pub telegram_token: String,
    pub telegram_chat_ids: Vec<i64>,

    // Scanning
    pub watchlist_path: String,
    pub cooldown_state_path: String,
    pub cooldown_hours: i64,
    pub scan_interval_minutes: u64,
    pub candle_limit: usize,

    // Token discovery
    pub discovery_enabled: bool,
    pub discovery_limit: usize,

    // Engine tuning (optional TOML file; built-in defaults otherwise)
    pub engine_params_path: Option<String>,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let telegram_chat_ids = required_env("TELEGRAM_CHAT_IDS")
            .split(',')
            .map(|s| {
                s.trim().parse::<i64>().unwrap_or_else(|_| {
                    panic!("TELEGRAM_CHAT_IDS contains non-numeric ID: '{}'", s.trim())
                })
            })
            .collect();

        Config {
            birdeye_api_key: required_env("BIRDEYE_API_KEY"),
            telegram_token: required_env("TELEGRAM_TOKEN"),
            telegram_chat_ids,
            watchlist_path: optional_env("WATCHLIST_PATH")
                .unwrap_or_else(|| "config/watchlist.toml".to_string()),
            cooldown_state_path: optional_env("COOLDOWN_STATE_PATH")
                .unwrap_or_else(|| "state/cooldown.json".to_string()),
            cooldown_hours: optional_env("COOLDOWN_HOURS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(72),
            scan_interval_minutes: optional_env("SCAN_INTERVAL_MINUTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            candle_limit: optional_env("CANDLE_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            discovery_enabled: optional_env("DISCOVERY_ENABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            discovery_limit: optional_env("DISCOVERY_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(25),
            engine_params_path: optional_env("ENGINE_PARAMS_PATH"),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
