//! Configuration types for the review notifier service

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;

/// Environment variable holding the status API token
pub const API_TOKEN_VAR: &str = "PRAKTIKUM_TOKEN";
/// Environment variable holding the Telegram bot token
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the destination chat id
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Homework status API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: String::new(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Telegram delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub chat_id: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api_base(),
            token: String::new(),
            chat_id: String::new(),
        }
    }
}

/// Poll cadence and starting point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Sleep after a successful iteration
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
    /// Sleep after a failed iteration
    #[serde(default = "default_retry_interval", with = "humantime_serde")]
    pub retry_interval: Duration,
    /// Starting cursor; process start time when absent
    #[serde(default)]
    pub from_date: Option<Cursor>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            retry_interval: default_retry_interval(),
            from_date: None,
        }
    }
}

fn default_endpoint() -> String {
    "https://praktikum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_interval() -> Duration {
    Duration::from_secs(300)
}

fn default_retry_interval() -> Duration {
    Duration::from_secs(5)
}

impl Config {
    /// Fill empty secrets from the process environment, then validate
    pub fn resolve_secrets(&mut self) -> crate::Result<()> {
        self.resolve_secrets_with(|name| std::env::var(name).ok())
    }

    /// Fill empty secrets using `lookup`, then validate
    pub fn resolve_secrets_with<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let slots = [
            (API_TOKEN_VAR, &mut self.api.token),
            (TELEGRAM_TOKEN_VAR, &mut self.telegram.token),
            (CHAT_ID_VAR, &mut self.telegram.chat_id),
        ];
        for (name, slot) in slots {
            if slot.is_empty() {
                if let Some(value) = lookup(name) {
                    tracing::debug!("Resolved {} from environment", name);
                    *slot = value;
                }
            }
        }
        self.validate()
    }

    /// Fail if any credential is missing
    pub fn validate(&self) -> crate::Result<()> {
        let missing: Vec<&str> = [
            (API_TOKEN_VAR, &self.api.token),
            (TELEGRAM_TOKEN_VAR, &self.telegram.token),
            (CHAT_ID_VAR, &self.telegram.chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(crate::ReviewNotifierError::Config(format!(
                "Missing required credentials: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::ReviewNotifierError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
