// src/voice/mod.rs
// Voice platform connection credentials (signed conversation URLs)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::VoiceSettings;
use crate::error::{IrisError, Result};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Hands out the credential a voice client needs to open a conversation
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// `None` when no platform is configured
    async fn connection_credential(&self) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    signed_url: String,
}

/// Fetches signed URLs from the voice platform
pub struct SignedUrlIssuer {
    client: Client,
    settings: VoiceSettings,
}

impl SignedUrlIssuer {
    pub fn new(settings: VoiceSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, settings }
    }

    /// Endpoint with the agent id attached
    fn request_url(&self, agent_id: &str) -> Result<url::Url> {
        let mut url = url::Url::parse(&self.settings.signed_url_endpoint).map_err(|e| {
            IrisError::Config(format!(
                "Invalid signed URL endpoint '{}': {}",
                self.settings.signed_url_endpoint, e
            ))
        })?;
        url.query_pairs_mut().append_pair("agent_id", agent_id);
        Ok(url)
    }
}

#[async_trait]
impl CredentialIssuer for SignedUrlIssuer {
    async fn connection_credential(&self) -> Result<Option<String>> {
        let (Some(api_key), Some(agent_id)) =
            (self.settings.api_key.as_deref(), self.settings.agent_id.as_deref())
        else {
            debug!("Voice platform not configured, issuing session without credential");
            return Ok(None);
        };

        let url = self.request_url(agent_id)?;
        let response = self
            .client
            .get(url)
            .header("xi-api-key", api_key)
            .send()
            .await
            .map_err(|e| IrisError::Upstream(format!("Signed URL request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IrisError::Upstream(format!(
                "Voice platform error {}: {}",
                status, body
            )));
        }

        let parsed: SignedUrlResponse = response
            .json()
            .await
            .map_err(|e| IrisError::Upstream(format!("Malformed signed URL response: {}", e)))?;

        info!(agent_id = %agent_id, "Signed conversation URL issued");
        Ok(Some(parsed.signed_url))
    }
}

/// Issuer for deployments without a voice platform
pub struct NoCredentials;

#[async_trait]
impl CredentialIssuer for NoCredentials {
    async fn connection_credential(&self) -> Result<Option<String>> {
        Ok(None)
    }
}
