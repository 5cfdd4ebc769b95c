//! HTTP client abstraction for testability

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ReviewNotifierError, TransportError};

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Abstraction over HTTP client for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request with extra headers and query parameters
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> crate::Result<HttpResponse>;

    /// Send a POST request with a JSON body
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> crate::Result<HttpResponse>;
}

/// Production HTTP client using reqwest.
///
/// Every request is bounded by the timeout given at construction.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ReviewNotifierError::Config(format!("Failed to build HTTP client: {}", e))
            })?;
        tracing::debug!("Created HTTP client with {:?} request timeout", timeout);
        Ok(Self { client })
    }
}

/// Sort a reqwest failure into the transport error the poll loop reports
fn classify(context: &str, e: reqwest::Error) -> ReviewNotifierError {
    let message = format!("{}: {}", context, e);
    let err = if e.is_timeout() {
        TransportError::Timeout(message)
    } else if e.is_decode() {
        TransportError::DecodeFailure(message)
    } else {
        TransportError::ConnectionFailure(message)
    };
    err.into()
}

async fn read_response(context: &str, response: reqwest::Response) -> crate::Result<HttpResponse> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| classify(&format!("Reading {} response body", context), e))?;
    Ok(HttpResponse { status, body })
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> crate::Result<HttpResponse> {
        tracing::debug!("GET {} {:?}", url, query);
        let mut request = self.client.get(url).query(query);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify(&format!("GET {} failed", url), e))?;
        let response = read_response("GET", response).await?;

        tracing::debug!(
            "GET {} -> {} ({} bytes)",
            url,
            response.status,
            response.body.len()
        );
        Ok(response)
    }

    // The URL is left out of the logs: bot APIs carry their token in the path.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> crate::Result<HttpResponse> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| classify("POST failed", e.without_url()))?;
        let response = read_response("POST", response).await?;

        tracing::debug!(
            "POST -> {} ({} bytes)",
            response.status,
            response.body.len()
        );
        Ok(response)
    }
}
