// src/services/notifier.rs

//! Notification delivery.
//!
//! Rendered messages go out through the Telegram Bot API. A notifier with
//! no token or chat id logs and swallows sends instead of failing, so the
//! monitor keeps tracking state even when delivery is unconfigured.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::TelegramConfig;

/// Sink for rendered notification messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message.
    async fn send(&self, text: &str) -> Result<()>;
}

/// Notifier backed by the Telegram Bot API `sendMessage` endpoint.
pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    chat_id: String,
    disable_link_preview: bool,
    api_base: String,
}

impl TelegramNotifier {
    /// Build a notifier from configuration, falling back to the
    /// `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` environment variables
    /// for fields left empty.
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            client,
            bot_token: or_env(&config.bot_token, "TELEGRAM_BOT_TOKEN"),
            chat_id: or_env(&config.chat_id, "TELEGRAM_CHAT_ID"),
            disable_link_preview: config.disable_link_preview,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Whether both token and chat id are present.
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }

    fn send_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }

    fn payload(&self, text: &str) -> serde_json::Value {
        json!({
            "chat_id": self.chat_id,
            "text": text,
            "disable_web_page_preview": self.disable_link_preview,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        if !self.is_configured() {
            log::warn!("Telegram bot token or chat id not configured. Skipping send.");
            return Ok(());
        }

        let response = self
            .client
            .post(self.send_url())
            .json(&self.payload(text))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notify(format!(
                "Telegram send failed: {status} {body}"
            )));
        }
        Ok(())
    }
}

/// Notifier that prints messages to stdout, used for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        println!("{text}\n");
        Ok(())
    }
}

fn or_env(value: &str, var: &str) -> String {
    if value.is_empty() {
        std::env::var(var).unwrap_or_default()
    } else {
        value.to_string()
    }
}
