//! Homework status API client

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::ApiConfig;
use crate::cursor::Cursor;
use crate::error::TransportError;
use crate::io::HttpClient;

/// Longest error body, in chars, kept in a [`TransportError::ServerError`]
pub const MAX_ERROR_BODY_CHARS: usize = 512;

/// Reply of the status API for one query.
///
/// `homeworks` entries stay raw JSON; only the one the poll loop consults is
/// turned into a [`crate::status::StatusRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub homeworks: Vec<serde_json::Value>,
    #[serde(default)]
    pub current_date: Option<Cursor>,
}

impl FetchResponse {
    /// The entry consulted by the poll loop; later entries are ignored
    pub fn latest(&self) -> Option<&serde_json::Value> {
        self.homeworks.first()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default())
}

fn truncate_body(body: String) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body;
    }
    let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    truncated.push_str("...");
    truncated
}

/// Trait for querying status changes since a cursor
#[async_trait]
pub trait StatusFetcher: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, cursor: Cursor) -> crate::Result<FetchResponse>;
}

/// Client for the homework status endpoint
pub struct HomeworkApiClient {
    endpoint: String,
    token: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for HomeworkApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeworkApiClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl HomeworkApiClient {
    pub fn new(config: &ApiConfig, http: Arc<dyn HttpClient>) -> Self {
        tracing::debug!("Created HomeworkApiClient for {}", config.endpoint);
        Self {
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            http,
        }
    }
}

#[async_trait]
impl StatusFetcher for HomeworkApiClient {
    async fn fetch(&self, cursor: Cursor) -> crate::Result<FetchResponse> {
        let authorization = format!("OAuth {}", self.token);
        let from_date = cursor.to_string();

        let response = self
            .http
            .get(
                &self.endpoint,
                &[("Authorization", authorization.as_str())],
                &[("from_date", from_date.as_str())],
            )
            .await?;

        if !(200..300).contains(&response.status) {
            return Err(TransportError::ServerError {
                status: response.status,
                body: truncate_body(response.body),
            }
            .into());
        }

        let parsed: FetchResponse = serde_json::from_str(&response.body)
            .map_err(|e| TransportError::DecodeFailure(e.to_string()))?;

        tracing::debug!(
            "Fetched {} homework(s) since {}, current_date={:?}",
            parsed.homeworks.len(),
            cursor,
            parsed.current_date
        );
        Ok(parsed)
    }
}
