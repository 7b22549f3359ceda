// src/error.rs
// Standardized error types for iris

use thiserror::Error;

/// Main error type for the iris library
#[derive(Error, Debug)]
pub enum IrisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Convenience type alias for Result using IrisError
pub type Result<T> = std::result::Result<T, IrisError>;

impl From<String> for IrisError {
    fn from(s: String) -> Self {
        IrisError::InvalidInput(s)
    }
}
