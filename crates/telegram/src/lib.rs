pub mod format;

use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use tracing::{info, warn};

use common::{Alert, AlertSink, Error, Result};

/// Delivers alerts to one or more Telegram chats.
///
/// Delivery counts as successful if at least one chat accepted the
/// message; the cooldown only starts once somebody could have seen the
/// alert. Per-chat failures are logged and tolerated.
pub struct TelegramSink {
    bot: Bot,
    chat_ids: Vec<i64>,
}

impl TelegramSink {
    pub fn new(token: &str, chat_ids: Vec<i64>) -> Self {
        Self {
            bot: Bot::new(token),
            chat_ids,
        }
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    async fn deliver(&self, alert: &Alert) -> Result<()> {
        let text = format::alert_text(alert);
        let mut sent = 0usize;
        for chat_id in &self.chat_ids {
            match self
                .bot
                .send_message(ChatId(*chat_id), text.as_str())
                .disable_web_page_preview(true)
                .await
            {
                Ok(_) => sent += 1,
                Err(e) => {
                    warn!(chat_id = *chat_id, error = %e, "Telegram send failed");
                }
            }
        }
        if sent == 0 {
            return Err(Error::Delivery(format!(
                "all {} Telegram chats failed",
                self.chat_ids.len()
            )));
        }
        info!(
            sent,
            chats = self.chat_ids.len(),
            pattern = %alert.pattern,
            symbol = %alert.symbol,
            "Alert delivered to Telegram"
        );
        Ok(())
    }
}
