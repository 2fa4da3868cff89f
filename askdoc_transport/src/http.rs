//! Reqwest-backed implementation of the query transport.

use std::time::Duration;

use askdoc_core::{QueryTransport, RequestPayload};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

const QUERY_PATH: &str = "/api/v1/botresponse/get-response";
const CLEAR_PATH: &str = "/api/clear";
const HISTORY_PATH: &str = "/api/history";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delays (seconds) between retry attempts for query requests.
const QUERY_RETRY_DELAYS: [u64; 2] = [2, 4];

#[derive(Debug, Error)]
pub enum TransportError {
    /// The backend answered with an error status; `message` is whatever
    /// descriptive text its body carried.
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP client for the answering backend.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let base_url: String = base_url.into();
        info!("Creating HttpTransport for {base_url}");
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json(&self, path: &str, body: Option<&Value>) -> Result<Value, TransportError> {
        let mut request = self.client.post(format!("{}{path}", self.base_url));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::into_json(response).await
    }

    async fn into_json(response: reqwest::Response) -> Result<Value, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Value>().await?);
        }

        // Error bodies usually carry a descriptive `message` field; fall
        // back to a generic text when they do not.
        let message = response
            .json::<Value>()
            .await
            .ok()
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .map_or_else(|| "Failed to send query".to_string(), ToString::to_string);

        Err(TransportError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn send_query(&self, payload: &RequestPayload) -> anyhow::Result<Value> {
        debug!(
            question_len = payload.question.len(),
            pairs = payload.history.len(),
            "posting query"
        );
        let body = serde_json::to_value(payload)?;
        let response = crate::retry::retry_with_backoff(
            || self.post_json(QUERY_PATH, Some(&body)),
            &QUERY_RETRY_DELAYS,
        )
        .await?;
        Ok(response)
    }

    async fn clear_session(&self) -> anyhow::Result<()> {
        // Single attempt: the caller treats this as best-effort.
        self.post_json(CLEAR_PATH, None).await?;
        Ok(())
    }

    async fn fetch_history(&self) -> anyhow::Result<Value> {
        let response = self
            .client
            .get(format!("{}{HISTORY_PATH}", self.base_url))
            .send()
            .await
            .map_err(TransportError::Http)?;
        Ok(Self::into_json(response).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let transport =
            HttpTransport::new("http://localhost:8000/").unwrap_or_else(|_| unreachable!());
        assert_eq!(transport.base_url, "http://localhost:8000");
    }

    #[test]
    fn backend_error_displays_its_message() {
        let err = TransportError::Backend {
            status: 502,
            message: "model overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "model overloaded");
    }
}
