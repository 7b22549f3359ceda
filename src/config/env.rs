// src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::correlation::DEFAULT_IMAGE_NOTE;
use crate::llm::Provider;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_SIGNED_URL_ENDPOINT: &str =
    "https://api.elevenlabs.io/v1/convai/conversation/get-signed-url";

/// Model backend selection
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// LLM_PROVIDER as written, kept for validation
    pub requested_provider: String,
    pub provider: Provider,
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub default_temperature: f32,
}

/// Voice platform credentials for signed connection URLs
#[derive(Debug, Clone, Default)]
pub struct VoiceSettings {
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
    pub signed_url_endpoint: String,
}

impl VoiceSettings {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.agent_id.is_some()
    }
}

/// Full service configuration
#[derive(Debug, Clone)]
pub struct IrisConfig {
    pub host: String,
    pub port: u16,
    pub public_base_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub inline_images: bool,
    pub image_note: String,
    pub llm: LlmSettings,
    pub voice: VoiceSettings,
}

/// Configuration validation result
#[derive(Debug, Default)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Format as a human-readable report
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            for err in &self.errors {
                lines.push(format!("  - {}", err));
            }
        }

        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            for warn in &self.warnings {
                lines.push(format!("  - {}", warn));
            }
        }

        if lines.is_empty() {
            "Configuration OK".to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Strip a trailing `# comment` and whitespace from a numeric or boolean value.
/// Strings (keys, URLs, paths) may legitimately contain `#` and are only trimmed.
fn clean(raw: &str) -> &str {
    raw.split('#').next().unwrap_or("").trim()
}

/// Parse `key` from `lookup`, falling back to `default` when missing or unparsable
fn var_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => {
            let value = clean(&raw);
            match value.parse::<T>() {
                Ok(parsed) => {
                    debug!(key = key, "Config value read from environment");
                    parsed
                }
                Err(_) => {
                    warn!(key = key, value = %raw, "Config parse failed, using default");
                    default
                }
            }
        }
        None => default,
    }
}

/// Read a non-empty string value
fn var_opt<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn bool_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| parse_bool(clean(&v)))
        .unwrap_or(default)
}

impl IrisConfig {
    /// Load from the process environment (call once at startup, after dotenvy)
    pub fn from_env() -> Self {
        info!("Loading environment configuration");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var_opt(&lookup, "IRIS_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var_opt(&lookup, "IRIS_PORT") {
            Some(_) => var_or(&lookup, "IRIS_PORT", DEFAULT_PORT),
            None => var_or(&lookup, "PORT", DEFAULT_PORT),
        };
        let public_base_url = var_opt(&lookup, "IRIS_PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        Self {
            host,
            port,
            public_base_url,
            upload_dir: PathBuf::from(
                var_opt(&lookup, "IRIS_UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.into()),
            ),
            max_upload_bytes: var_or(&lookup, "IRIS_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            inline_images: bool_or(&lookup, "IRIS_INLINE_IMAGES", false),
            // The note is free text, so `#` is not treated as a comment here
            image_note: lookup("IRIS_IMAGE_NOTE")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE_NOTE.to_string()),
            llm: LlmSettings::from_lookup(&lookup),
            voice: VoiceSettings {
                api_key: var_opt(&lookup, "VOICE_API_KEY"),
                agent_id: var_opt(&lookup, "VOICE_AGENT_ID"),
                signed_url_endpoint: var_opt(&lookup, "VOICE_SIGNED_URL_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_SIGNED_URL_ENDPOINT.to_string()),
            },
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        if Provider::parse(&self.llm.requested_provider).is_none() {
            validation.add_warning(format!(
                "Unknown LLM_PROVIDER '{}', using {}. Valid options: openai, gemini, anthropic",
                self.llm.requested_provider, self.llm.provider
            ));
        }

        if self.llm.api_key.is_none() {
            validation.add_warning(format!(
                "No API key for {}. Set {}; completions will fail until it is set.",
                self.llm.provider,
                self.llm.provider.api_key_env_var()
            ));
        }

        if url::Url::parse(&self.public_base_url).is_err() {
            validation.add_error(format!(
                "IRIS_PUBLIC_BASE_URL '{}' is not a valid URL",
                self.public_base_url
            ));
        }

        if url::Url::parse(&self.llm.base_url).is_err() {
            validation.add_error(format!("LLM_BASE_URL '{}' is not a valid URL", self.llm.base_url));
        }

        if !self.voice.is_configured() {
            validation.add_warning(
                "VOICE_API_KEY / VOICE_AGENT_ID not set; sessions are issued without a connection credential",
            );
        }

        if self.max_upload_bytes == 0 {
            validation.add_error("IRIS_MAX_UPLOAD_BYTES must be greater than zero");
        }

        validation
    }
}

impl LlmSettings {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let requested_provider =
            var_opt(lookup, "LLM_PROVIDER").unwrap_or_else(|| "openai".to_string());
        let provider = Provider::parse(&requested_provider).unwrap_or(Provider::OpenAi);

        let api_key = match provider {
            // Gemini's OpenAI-compatible endpoint also accepts the OpenAI variable
            Provider::Gemini => var_opt(lookup, "GEMINI_API_KEY")
                .or_else(|| var_opt(lookup, "OPENAI_API_KEY")),
            other => var_opt(lookup, other.api_key_env_var()),
        };

        Self {
            requested_provider,
            provider,
            api_key,
            base_url: var_opt(lookup, "LLM_BASE_URL")
                .unwrap_or_else(|| provider.default_base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
            default_model: var_opt(lookup, "DEFAULT_MODEL")
                .unwrap_or_else(|| provider.default_model().to_string()),
            default_temperature: var_or(lookup, "DEFAULT_TEMPERATURE", DEFAULT_TEMPERATURE),
        }
    }
}
