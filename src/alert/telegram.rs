//! Telegram bot alert sink.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tokio::time::timeout;

use crate::alert::{AlertError, AlertSink};
use crate::config::AlertConfig;

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Sends alerts through the Bot API `sendMessage` method.
#[derive(Clone)]
pub struct TelegramSink {
    client: Client,
    config: AlertConfig,
    timeout_duration: Duration,
}

impl TelegramSink {
    pub fn new(config: AlertConfig) -> Self {
        let timeout_duration = Duration::from_secs(config.timeout_secs);
        Self {
            client: Client::new(),
            config,
            timeout_duration,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    async fn send(&self, text: &str) -> Result<(), AlertError> {
        let payload = SendMessage {
            chat_id: &self.config.chat_id,
            text,
            parse_mode: "HTML",
        };

        let exchange = async {
            let response = self
                .client
                .post(self.endpoint())
                .json(&payload)
                .send()
                .await
                .map_err(|e| AlertError::Transport(e.to_string()))?;

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }
            let body = response.text().await.unwrap_or_default();
            Err(AlertError::Rejected {
                status: status.as_u16(),
                body,
            })
        };

        match timeout(self.timeout_duration, exchange).await {
            Ok(result) => result,
            Err(_) => Err(AlertError::Timeout(self.config.timeout_secs)),
        }
    }
}

impl std::fmt::Debug for TelegramSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSink")
            .field("api_base", &self.config.api_base)
            .field("chat_id", &self.config.chat_id)
            .finish()
    }
}
