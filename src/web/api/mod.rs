// src/web/api/mod.rs
// Route handlers

mod completion;
mod images;
mod session;

use axum::{Json, extract::State, response::IntoResponse};

use crate::web::state::AppState;

pub use completion::chat_completions;
pub use images::{serve_image, upload_image};
pub use session::issue_session;

// ═══════════════════════════════════════
// HEALTH
// ═══════════════════════════════════════

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.dispatcher.provider_type().to_string(),
        "model": state.dispatcher.model_name(),
        "correlation": state.engine.stats(),
    }))
}
