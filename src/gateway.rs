//! Language model gateway seam.
//!
//! The orchestrator only sees this trait, so tests can script failures and
//! the provider is chosen once from configuration.

use crate::anthropic::AnthropicClient;
use crate::config::{ChatConfig, Provider};
use crate::error::BackendError;
use crate::logging;
use crate::openai::OpenAIClient;
use async_trait::async_trait;
use std::sync::Arc;

/// Reply used when the backend answers with an empty or blank message.
pub const EMPTY_REPLY: &str = "I don't have an answer for that.";

/// Substitute [`EMPTY_REPLY`] for blank generated text.
pub fn non_blank_reply(text: Option<String>) -> String {
    text.filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| EMPTY_REPLY.to_string())
}

/// One single-turn completion: system prompt plus the visitor's raw message.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_message: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait LanguageModelGateway: Send + Sync {
    /// Generated reply text, or a typed failure.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;

    fn provider_name(&self) -> &'static str;
}

/// Build the configured provider, or `None` when no usable key is set.
pub fn build_gateway(config: &ChatConfig) -> Option<Arc<dyn LanguageModelGateway>> {
    if !config.is_backend_configured() {
        return None;
    }
    let api_key = config.api_key()?;

    let built: Result<Arc<dyn LanguageModelGateway>, BackendError> = match config.provider {
        Provider::OpenAI => {
            OpenAIClient::new(api_key, &config.openai_base_url, config.request_timeout)
                .map(|c| Arc::new(c) as Arc<dyn LanguageModelGateway>)
        }
        Provider::Anthropic => {
            AnthropicClient::new(api_key, &config.anthropic_base_url, config.request_timeout)
                .map(|c| Arc::new(c) as Arc<dyn LanguageModelGateway>)
        }
    };

    match built {
        Ok(gateway) => Some(gateway),
        Err(e) => {
            logging::log_error(
                None,
                &format!("Failed to build {} client: {}", config.provider.as_str(), e),
            );
            None
        }
    }
}
