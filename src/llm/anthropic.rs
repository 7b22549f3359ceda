// src/llm/anthropic.rs
// Anthropic Messages API adapter: OpenAI-format in, chat-completion-format out

use async_trait::async_trait;
use axum::body::Bytes;
use futures::StreamExt;
use serde_json::{Value, json};
use std::time::Instant;
use tracing::{debug, instrument};

use super::http_client::LlmHttpClient;
use super::logging::{log_completion, log_usage};
use super::provider::{Dispatcher, Provider};
use super::{ChatMessage, Completion, CompletionRequest, ContentPart, MessageContent};
use crate::config::LlmSettings;
use crate::error::{IrisError, Result};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
const SYSTEM_PREFIX: &str = "System instruction: ";
const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

pub struct AnthropicDispatcher {
    base_url: String,
    api_key: Option<String>,
    default_model: String,
    default_temperature: f32,
    http: LlmHttpClient,
}

impl AnthropicDispatcher {
    pub fn new(settings: &LlmSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            default_model: settings.default_model.clone(),
            default_temperature: settings.default_temperature,
            http: LlmHttpClient::default(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn body(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": request.model.as_deref().unwrap_or(&self.default_model),
            "messages": convert_messages(&request.messages),
            "temperature": request.temperature.unwrap_or(self.default_temperature),
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "stream": false,
        })
    }
}

#[async_trait]
impl Dispatcher for AnthropicDispatcher {
    #[instrument(skip(self, request), fields(provider = "anthropic", message_count = request.messages.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| IrisError::Config("ANTHROPIC_API_KEY is not set".into()))?;

        let request_id = uuid::Uuid::new_v4().to_string();
        let body = self.body(&request);
        let url = self.endpoint();
        let start = Instant::now();

        debug!(request_id = %request_id, url = %url, "Dispatching Anthropic completion");

        let text = self
            .http
            .post_json(&request_id, &body, |client| {
                client
                    .post(&url)
                    .header("x-api-key", api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
            })
            .await?;

        let reply: Value = serde_json::from_str(&text)
            .map_err(|e| IrisError::Upstream(format!("Failed to parse Anthropic response: {}", e)))?;
        let completion = to_chat_completion(&reply);

        log_completion(
            &request_id,
            "anthropic",
            completion["model"].as_str().unwrap_or_default(),
            start.elapsed().as_millis() as u64,
            request.messages.len(),
            request.stream,
        );
        log_usage(&request_id, "anthropic", completion.get("usage"));

        if request.stream {
            // No native streaming: replay the whole answer as one chunk
            let frames = vec![
                Ok(sse_frame(&to_chunk(&completion))),
                Ok(Bytes::from_static(b"data: [DONE]\n\n")),
            ];
            return Ok(Completion::Stream(futures::stream::iter(frames).boxed()));
        }

        Ok(Completion::Json(completion))
    }

    fn provider_type(&self) -> Provider {
        Provider::Anthropic
    }

    fn model_name(&self) -> String {
        self.default_model.clone()
    }
}

// ============================================================================
// Message conversion
// ============================================================================

/// Convert OpenAI-format messages into Anthropic `messages`.
///
/// System messages become user turns with a prefix, since the Messages API
/// has no system role inside the list. Consecutive turns from the same role
/// are merged so user/assistant alternate. Other roles are dropped.
pub fn convert_messages(messages: &[ChatMessage]) -> Vec<Value> {
    let mut converted: Vec<(String, Vec<Value>)> = Vec::new();

    for message in messages {
        let (role, blocks) = match message.role.as_str() {
            "system" => (
                "user",
                vec![text_block(format!("{}{}", SYSTEM_PREFIX, message.text()))],
            ),
            "user" | "assistant" => (message.role.as_str(), content_blocks(&message.content)),
            _ => continue,
        };
        if blocks.is_empty() {
            continue;
        }

        match converted.last_mut() {
            Some((last_role, last_blocks)) if last_role == role => last_blocks.extend(blocks),
            _ => converted.push((role.to_string(), blocks)),
        }
    }

    converted
        .into_iter()
        .map(|(role, content)| json!({ "role": role, "content": content }))
        .collect()
}

fn content_blocks(content: &Option<MessageContent>) -> Vec<Value> {
    match content {
        Some(MessageContent::Text(text)) => vec![text_block(text.clone())],
        // Parts the Messages API has no equivalent for are dropped
        Some(MessageContent::Parts(parts)) => parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text_block(text.clone())),
                ContentPart::ImageUrl { image_url } => Some(image_block(&image_url.url)),
                ContentPart::Other(_) => None,
            })
            .collect(),
        None => Vec::new(),
    }
}

fn text_block(text: String) -> Value {
    json!({ "type": "text", "text": text })
}

fn image_block(url: &str) -> Value {
    match parse_data_url(url) {
        Some((media_type, data)) => json!({
            "type": "image",
            "source": { "type": "base64", "media_type": media_type, "data": data }
        }),
        None => json!({
            "type": "image",
            "source": { "type": "url", "url": url }
        }),
    }
}

/// Split `data:{mime};base64,{payload}` into media type and payload
fn parse_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;
    let media_type = header
        .split(';')
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or(FALLBACK_MEDIA_TYPE);
    Some((media_type, data))
}

// ============================================================================
// Response reshaping
// ============================================================================

fn finish_reason(stop_reason: Option<&str>) -> &'static str {
    match stop_reason {
        Some("max_tokens") => "length",
        Some("tool_use") => "tool_calls",
        _ => "stop",
    }
}

/// Reshape an Anthropic Messages reply into a `chat.completion` object
pub fn to_chat_completion(reply: &Value) -> Value {
    let text = reply["content"]
        .as_array()
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b["type"] == "text")
                .filter_map(|b| b["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let input = reply["usage"]["input_tokens"].as_u64().unwrap_or(0);
    let output = reply["usage"]["output_tokens"].as_u64().unwrap_or(0);

    json!({
        "id": reply["id"].as_str().map(str::to_string)
            .unwrap_or_else(|| format!("chatcmpl-{}", uuid::Uuid::new_v4())),
        "object": "chat.completion",
        "created": chrono::Utc::now().timestamp(),
        "model": reply["model"],
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": finish_reason(reply["stop_reason"].as_str()),
        }],
        "usage": {
            "prompt_tokens": input,
            "completion_tokens": output,
            "total_tokens": input + output,
        }
    })
}

/// The single `chat.completion.chunk` carrying a whole completion
fn to_chunk(completion: &Value) -> Value {
    let choice = &completion["choices"][0];
    json!({
        "id": completion["id"],
        "object": "chat.completion.chunk",
        "created": completion["created"],
        "model": completion["model"],
        "choices": [{
            "index": 0,
            "delta": { "role": "assistant", "content": choice["message"]["content"] },
            "finish_reason": choice["finish_reason"],
        }]
    })
}

fn sse_frame(value: &Value) -> Bytes {
    Bytes::from(format!("data: {}\n\n", value))
}
