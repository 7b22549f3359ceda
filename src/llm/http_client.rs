// src/llm/http_client.rs
// Shared HTTP client configuration for all model backends

use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::warn;

use crate::error::{IrisError, Result};

/// Default maximum retry attempts for transient failures
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default base backoff duration between retries (doubles each attempt)
const DEFAULT_BASE_BACKOFF_SECS: u64 = 1;
/// Default request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

pub struct LlmHttpClient {
    client: Client,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl Default for LlmHttpClient {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }
}

impl LlmHttpClient {
    pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            request_timeout,
            connect_timeout,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: Duration::from_secs(DEFAULT_BASE_BACKOFF_SECS),
        }
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Send with retry and return the successful response unread, so callers
    /// can either buffer it or stream it.
    ///
    /// `build_request` is called on each attempt with the client, letting
    /// callers pick URL, headers and auth.
    pub async fn send_with_retry<F>(&self, request_id: &str, build_request: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempts = 0;
        let mut backoff = self.base_backoff;

        loop {
            match build_request(&self.client).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let error_body = response.text().await.unwrap_or_default();

                    // Check for transient errors
                    if attempts < self.max_attempts
                        && (status.as_u16() == 429 || status.is_server_error())
                    {
                        warn!(
                            request_id = %request_id,
                            status = %status,
                            error = %error_body,
                            "Transient error, retrying in {:?}...",
                            backoff
                        );
                        tokio::time::sleep(backoff).await;
                        attempts += 1;
                        backoff *= 2;
                        continue;
                    }

                    return Err(IrisError::Upstream(format!("API error {}: {}", status, error_body)));
                }
                Err(e) => {
                    // Only connect/timeout failures are safe to retry
                    if attempts < self.max_attempts && (e.is_connect() || e.is_timeout()) {
                        warn!(
                            request_id = %request_id,
                            error = %e,
                            "Request failed (connect/timeout), retrying in {:?}...",
                            backoff
                        );
                        tokio::time::sleep(backoff).await;
                        attempts += 1;
                        backoff *= 2;
                        continue;
                    }
                    return Err(IrisError::Upstream(format!("Request failed after retries: {}", e)));
                }
            }
        }
    }

    /// POST a JSON body with retry and return the response text
    pub async fn post_json(
        &self,
        request_id: &str,
        body: &serde_json::Value,
        build_request: impl Fn(&Client) -> RequestBuilder,
    ) -> Result<String> {
        let response = self
            .send_with_retry(request_id, |client| build_request(client).json(body))
            .await?;
        Ok(response.text().await?)
    }
}
