// src/llm/logging.rs
// Shared dispatch logging helpers

use serde_json::Value;
use tracing::info;

/// Log usage statistics from an OpenAI-shaped `usage` object, if present
pub fn log_usage(request_id: &str, provider: &str, usage: Option<&Value>) {
    let Some(usage) = usage else {
        return;
    };
    let prompt_tokens = usage.get("prompt_tokens").and_then(Value::as_u64);
    let completion_tokens = usage.get("completion_tokens").and_then(Value::as_u64);
    let total_tokens = usage.get("total_tokens").and_then(Value::as_u64);
    info!(
        request_id = %request_id,
        prompt_tokens = prompt_tokens,
        completion_tokens = completion_tokens,
        total_tokens = total_tokens,
        "{} usage stats", provider
    );
}

/// Log completion summary for a dispatched call
pub fn log_completion(
    request_id: &str,
    provider: &str,
    model: &str,
    duration_ms: u64,
    message_count: usize,
    stream: bool,
) {
    info!(
        request_id = %request_id,
        model = %model,
        duration_ms = duration_ms,
        message_count = message_count,
        stream = stream,
        "{} completion dispatched", provider
    );
}
