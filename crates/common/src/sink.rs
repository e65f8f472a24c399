use async_trait::async_trait;

use crate::{Alert, Result};

/// The dispatch boundary for triggered alerts.
///
/// `TelegramSink` in `crates/telegram` implements this for production.
/// The scan coordinator commits the cooldown transition only after
/// `deliver` returns `Ok`, so a failed delivery leaves the instrument
/// eligible to re-alert on the next cycle.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: &Alert) -> Result<()>;
}
