// src/llm/provider.rs
// Model backend abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Completion, CompletionRequest};
use crate::error::Result;

/// LLM provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
    Anthropic,
}

impl Provider {
    /// Parse provider from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "gemini" => Some(Self::Gemini),
            "anthropic" | "claude" => Some(Self::Anthropic),
            _ => None,
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Default model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Gemini => "gemini-2.5-pro-preview-03-25",
            Self::Anthropic => "claude-3-opus-20240229",
        }
    }

    /// API root; Gemini is reached through its OpenAI-compatible surface
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            Self::Anthropic => "https://api.anthropic.com",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Forwards (already augmented) completion requests to a model backend
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion>;

    /// Get the provider type
    fn provider_type(&self) -> Provider;

    /// Model used when the request names none
    fn model_name(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Provider::parse("OpenAI"), Some(Provider::OpenAi));
        assert_eq!(Provider::parse(" gemini "), Some(Provider::Gemini));
        assert_eq!(Provider::parse("claude"), Some(Provider::Anthropic));
        assert_eq!(Provider::parse("deepseek"), None);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for p in [Provider::OpenAi, Provider::Gemini, Provider::Anthropic] {
            assert_eq!(Provider::parse(&p.to_string()), Some(p));
        }
    }

    #[test]
    fn test_env_vars() {
        assert_eq!(Provider::OpenAi.api_key_env_var(), "OPENAI_API_KEY");
        assert_eq!(Provider::Anthropic.api_key_env_var(), "ANTHROPIC_API_KEY");
    }
}
