// src/llm/mod.rs
// Model backends (OpenAI, Gemini, Anthropic) behind one dispatcher trait

mod anthropic;
mod factory;
mod http_client;
mod logging;
mod openai_compat;
mod provider;
mod types;

pub use anthropic::{ANTHROPIC_VERSION, AnthropicDispatcher, DEFAULT_MAX_TOKENS, convert_messages};
pub use factory::create_dispatcher;
pub use http_client::LlmHttpClient;
pub use openai_compat::OpenAiCompatDispatcher;
pub use provider::{Dispatcher, Provider};
pub use types::{ChatMessage, Completion, CompletionRequest, ContentPart, ImageUrl, MessageContent};
