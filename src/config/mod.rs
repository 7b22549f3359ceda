// src/config/mod.rs
// Configuration loading

mod env;

pub use env::{
    ConfigValidation, DEFAULT_HOST, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT,
    DEFAULT_SIGNED_URL_ENDPOINT, DEFAULT_TEMPERATURE, DEFAULT_UPLOAD_DIR, IrisConfig, LlmSettings,
    VoiceSettings,
};
