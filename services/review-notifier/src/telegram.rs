//! Telegram Bot API message sender

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::TelegramConfig;
use crate::io::HttpClient;
use crate::notifier::MessageSender;

/// Envelope returned by every Bot API method
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through the `sendMessage` Bot API method
pub struct TelegramSender {
    send_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for TelegramSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSender").finish_non_exhaustive()
    }
}

impl TelegramSender {
    pub fn new(config: &TelegramConfig, http: Arc<dyn HttpClient>) -> Self {
        let send_url = format!(
            "{}/bot{}/sendMessage",
            config.api_base.trim_end_matches('/'),
            config.token
        );
        tracing::debug!("Created TelegramSender for {}", config.api_base);
        Self { send_url, http }
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    fn type_name(&self) -> &str {
        "telegram"
    }

    async fn send_message(&self, destination: &str, text: &str) -> crate::Result<()> {
        let body = serde_json::json!({
            "chat_id": destination,
            "text": text,
        });

        tracing::debug!("Sending Telegram message to chat {}", destination);
        let response = self.http.post_json(&self.send_url, &body).await?;

        let parsed = serde_json::from_str::<TelegramResponse>(&response.body).ok();
        let description = parsed
            .as_ref()
            .and_then(|p| p.description.clone())
            .unwrap_or_else(|| response.body.clone());

        if response.status != 200 {
            return Err(crate::ReviewNotifierError::Delivery(format!(
                "Telegram API returned status {}: {}",
                response.status, description
            )));
        }
        match parsed {
            Some(TelegramResponse { ok: true, .. }) => Ok(()),
            _ => Err(crate::ReviewNotifierError::Delivery(format!(
                "Telegram API rejected message: {}",
                description
            ))),
        }
    }
}
