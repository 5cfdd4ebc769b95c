//! Test doubles shared by the step definitions

use std::collections::VecDeque;

use review_notifier::io::{HttpClient, HttpResponse};
use review_notifier::TransportError;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A recorded GET request
#[derive(Debug, Clone)]
pub struct RecordedGet {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub at: Instant,
}

/// An HTTP client that replays queued GET responses and records POST bodies.
///
/// Once the GET queue is drained it answers with an empty status list and
/// cancels `cancel_when_drained`, if set.
#[derive(Debug, Default)]
pub struct CannedHttpClient {
    get_responses: RwLock<VecDeque<review_notifier::Result<HttpResponse>>>,
    gets: RwLock<Vec<RecordedGet>>,
    posts: RwLock<Vec<serde_json::Value>>,
    post_response: RwLock<Option<HttpResponse>>,
    cancel_when_drained: RwLock<Option<CancellationToken>>,
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl CannedHttpClient {
    pub async fn push_body(&self, status: u16, body: &str) {
        self.get_responses.write().await.push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub async fn push_error(&self, error: TransportError) {
        self.get_responses.write().await.push_back(Err(error.into()));
    }

    pub async fn set_post_response(&self, status: u16, body: &str) {
        *self.post_response.write().await = Some(HttpResponse {
            status,
            body: body.to_string(),
        });
    }

    pub async fn cancel_when_drained(&self, token: CancellationToken) {
        *self.cancel_when_drained.write().await = Some(token);
    }

    pub async fn gets(&self) -> Vec<RecordedGet> {
        self.gets.read().await.clone()
    }

    /// Texts of every message posted to the Bot API
    pub async fn sent_texts(&self) -> Vec<String> {
        self.posts
            .read()
            .await
            .iter()
            .filter_map(|body| body["text"].as_str().map(str::to_string))
            .collect()
    }

    pub async fn posts(&self) -> Vec<serde_json::Value> {
        self.posts.read().await.clone()
    }
}

#[async_trait::async_trait]
impl HttpClient for CannedHttpClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> review_notifier::Result<HttpResponse> {
        self.gets.write().await.push(RecordedGet {
            url: url.to_string(),
            headers: owned(headers),
            query: owned(query),
            at: Instant::now(),
        });

        let (next, drained) = {
            let mut queue = self.get_responses.write().await;
            (queue.pop_front(), queue.is_empty())
        };
        if drained {
            if let Some(token) = self.cancel_when_drained.read().await.as_ref() {
                token.cancel();
            }
        }

        next.unwrap_or_else(|| {
            Ok(HttpResponse {
                status: 200,
                body: r#"{"homeworks": []}"#.to_string(),
            })
        })
    }

    async fn post_json(
        &self,
        _url: &str,
        body: &serde_json::Value,
    ) -> review_notifier::Result<HttpResponse> {
        self.posts.write().await.push(body.clone());
        let response = self.post_response.read().await.clone();
        Ok(response.unwrap_or_else(|| HttpResponse {
            status: 200,
            body: r#"{"ok":true,"result":{"message_id":1}}"#.to_string(),
        }))
    }
}
