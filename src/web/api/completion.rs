// src/web/api/completion.rs
// OpenAI-compatible chat completions with image injection

use axum::{
    Json,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::llm::{Completion, CompletionRequest};
use crate::web::error::{ApiError, ApiResult};
use crate::web::state::AppState;

/// Header a caller can set to name the conversation explicitly
pub const CONVERSATION_ID_HEADER: &str = "x-conversation-id";

/// Resolve the caller's session, splice in its pending image (once), and
/// forward to the configured backend. Streams pass through as SSE.
#[instrument(skip_all)]
pub async fn chat_completions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::bad_request("Request body is empty"));
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))?;

    let header_id = headers
        .get(CONVERSATION_ID_HEADER)
        .and_then(|v| v.to_str().ok());
    let external_id = state.engine.external_id(header_id, &payload);

    let mut request: CompletionRequest = serde_json::from_value(payload)
        .map_err(|e| ApiError::bad_request(format!("Invalid completion request: {}", e)))?;

    let augmented = state
        .engine
        .augment(external_id.as_ref(), std::mem::take(&mut request.messages))
        .await;
    request.messages = augmented.messages;

    debug!(
        step = %augmented.resolution.step,
        injected = augmented.injected.is_some(),
        message_count = request.messages.len(),
        stream = request.stream,
        "Forwarding completion"
    );

    // Any backend failure, including a missing key, surfaces as 502
    let completion = state.dispatcher.complete(request).await.map_err(|e| {
        error!(error = %e, "Dispatch failed");
        ApiError::bad_gateway(e.to_string())
    })?;

    Ok(match completion {
        Completion::Json(value) => Json(value).into_response(),
        Completion::Stream(stream) => (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from_stream(stream),
        )
            .into_response(),
    })
}
