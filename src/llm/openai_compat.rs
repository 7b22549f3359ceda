// src/llm/openai_compat.rs
// OpenAI-compatible chat completions (OpenAI itself and Gemini's compat endpoint)

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, instrument};

use super::http_client::LlmHttpClient;
use super::logging::{log_completion, log_usage};
use super::provider::{Dispatcher, Provider};
use super::{ChatMessage, Completion, CompletionRequest};
use crate::config::LlmSettings;
use crate::error::{IrisError, Result};

/// Chat completion request body (OpenAI-compatible format)
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

pub struct OpenAiCompatDispatcher {
    provider: Provider,
    base_url: String,
    api_key: Option<String>,
    default_model: String,
    default_temperature: f32,
    http: LlmHttpClient,
}

impl OpenAiCompatDispatcher {
    pub fn new(settings: &LlmSettings) -> Self {
        Self {
            provider: settings.provider,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            default_model: settings.default_model.clone(),
            default_temperature: settings.default_temperature,
            http: LlmHttpClient::default(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Request body with defaults filled in
    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: request.model.as_deref().unwrap_or(&self.default_model),
            messages: &request.messages,
            temperature: Some(request.temperature.unwrap_or(self.default_temperature)),
            stream: request.stream,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl Dispatcher for OpenAiCompatDispatcher {
    #[instrument(skip(self, request), fields(provider = %self.provider, message_count = request.messages.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            IrisError::Config(format!("{} is not set", self.provider.api_key_env_var()))
        })?;

        let request_id = uuid::Uuid::new_v4().to_string();
        let body = serde_json::to_value(self.body(&request))?;
        let model = body["model"].as_str().unwrap_or_default().to_string();
        let url = self.endpoint();
        let start = Instant::now();

        debug!(request_id = %request_id, url = %url, "Dispatching completion");

        let response = self
            .http
            .send_with_retry(&request_id, |client| {
                client.post(&url).bearer_auth(api_key).json(&body)
            })
            .await?;

        log_completion(
            &request_id,
            &self.provider.to_string(),
            &model,
            start.elapsed().as_millis() as u64,
            request.messages.len(),
            request.stream,
        );

        if request.stream {
            let stream = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(IrisError::from))
                .boxed();
            return Ok(Completion::Stream(stream));
        }

        let text = response.text().await?;
        let json: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| IrisError::Upstream(format!("Failed to parse chat response: {}", e)))?;
        log_usage(&request_id, &self.provider.to_string(), json.get("usage"));
        Ok(Completion::Json(json))
    }

    fn provider_type(&self) -> Provider {
        self.provider
    }

    fn model_name(&self) -> String {
        self.default_model.clone()
    }
}
