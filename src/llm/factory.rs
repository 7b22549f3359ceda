// src/llm/factory.rs
// Dispatcher selection from configuration

use std::sync::Arc;
use tracing::{info, warn};

use super::anthropic::AnthropicDispatcher;
use super::openai_compat::OpenAiCompatDispatcher;
use super::provider::{Dispatcher, Provider};
use crate::config::LlmSettings;

/// Build the dispatcher for the configured provider
pub fn create_dispatcher(settings: &LlmSettings) -> Arc<dyn Dispatcher> {
    if settings.api_key.is_none() {
        warn!(
            provider = %settings.provider,
            env_var = settings.provider.api_key_env_var(),
            "No API key configured; completions will fail"
        );
    }

    info!(
        provider = %settings.provider,
        model = %settings.default_model,
        base_url = %settings.base_url,
        "LLM dispatcher initialized"
    );

    match settings.provider {
        Provider::OpenAi | Provider::Gemini => Arc::new(OpenAiCompatDispatcher::new(settings)),
        Provider::Anthropic => Arc::new(AnthropicDispatcher::new(settings)),
    }
}
