// src/web/api/images.rs
// Image upload and serving

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::correlation::SessionToken;
use crate::web::error::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub session_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub image_url: String,
    pub session_token: SessionToken,
}

fn multipart_error(e: axum::extract::multipart::MultipartError, what: &str) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(format!("Upload exceeds the size limit: {}", e))
    } else {
        ApiError::bad_request(format!("Failed to read {}: {}", what, e))
    }
}

/// Accept an image for a session token (form field or `?session_token=`).
/// Any prior pending image for the token is replaced.
pub async fn upload_image(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut token = query.session_token;
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "multipart field"))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "session_token" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, "session_token"))?;
                token = Some(text);
            }
            "image" | "file" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, "image data"))?;
                image = Some(data.to_vec());
            }
            other => debug!(field = %other, "Ignoring multipart field"),
        }
    }

    let token = token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .map(SessionToken::from)
        .ok_or_else(|| ApiError::bad_request("Missing 'session_token'"))?;

    let bytes = image.ok_or_else(|| ApiError::bad_request("Missing 'image' or 'file' field"))?;
    if bytes.is_empty() {
        return Err(ApiError::bad_request("Image file is empty"));
    }

    let upload = state.engine.upload_image(token.clone(), &bytes).await?;

    info!(
        session_token = %token,
        image = %upload.image.name,
        size = bytes.len(),
        "Image uploaded"
    );

    Ok(Json(UploadResponse {
        image_url: upload.url,
        session_token: token,
    }))
}

/// Serve a stored image by file name
pub async fn serve_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let (bytes, mime) = state.images.read_named(&name).await?;
    Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response())
}
