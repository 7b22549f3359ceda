// src/web/mod.rs
// HTTP surface: sessions, uploads, image serving and completions

pub mod api;
pub mod error;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::web::state::AppState;

/// Room for multipart boundaries and the token field on top of the image itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the web server router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.max_upload_bytes().saturating_add(MULTIPART_OVERHEAD_BYTES);

    let api_router = Router::new()
        .route("/session", get(api::issue_session).post(api::issue_session))
        .route("/upload", post(api::upload_image));

    Router::new()
        .route("/health", get(api::health))
        .nest("/api", api_router)
        .route("/images/{name}", get(api::serve_image))
        // OpenAI-compatible surface for the voice platform's custom LLM hook
        .route("/v1/chat/completions", post(api::chat_completions))
        .route("/chat/completions", post(api::chat_completions))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
