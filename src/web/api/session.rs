// src/web/api/session.rs
// Session issuance for voice clients

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::info;

use crate::correlation::SessionToken;
use crate::web::error::ApiResult;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Signed conversation URL, `null` when no voice platform is configured
    pub connection_credential: Option<String>,
    pub session_token: SessionToken,
}

/// Fetch a connection credential, then mint a session token.
/// A platform failure returns 502 and leaves the pending slot untouched.
pub async fn issue_session(State(state): State<AppState>) -> ApiResult<Json<SessionResponse>> {
    let connection_credential = state.credentials.connection_credential().await?;
    let session_token = state.engine.issue_session();

    info!(
        session_token = %session_token,
        credential = connection_credential.is_some(),
        "Session issued"
    );

    Ok(Json(SessionResponse {
        connection_credential,
        session_token,
    }))
}
