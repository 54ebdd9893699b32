use crate::canned::CannedResponseTable;
use crate::classifier::classify;
use crate::config::ChatConfig;
use crate::content::ContentRepository;
use crate::error::BackendError;
use crate::fallback::{fallback_reply, Reply};
use crate::gateway::{non_blank_reply, CompletionRequest, LanguageModelGateway};
use crate::logging;
use crate::prompts::{compose_context, compose_system_prompt, PromptOptions};
use std::sync::Arc;

/// Shown once before the first canned reply that follows a backend failure.
pub const TRANSITION_NOTICE: &str =
    "I'm having trouble with my AI capabilities right now. Let me use my basic responses instead.";

/// Everything one user turn produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Present only when this turn's backend call failed.
    pub transitional: Option<Reply>,
    pub reply: Reply,
    pub backend_error: Option<BackendError>,
}

impl TurnOutcome {
    pub fn backend_failed(&self) -> bool {
        self.backend_error.is_some()
    }
}

pub struct Orchestrator {
    gateway: Option<Arc<dyn LanguageModelGateway>>,
    canned: Arc<CannedResponseTable>,
    system_prompt: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl Orchestrator {
    /// The system prompt is composed here, once, from the loaded data.
    pub fn new(
        gateway: Option<Arc<dyn LanguageModelGateway>>,
        repository: &ContentRepository,
        canned: Arc<CannedResponseTable>,
        config: &ChatConfig,
    ) -> Self {
        let context = compose_context(repository, &canned);
        let options = PromptOptions {
            owner_name: config.owner_name.clone(),
            topic_markers: config.topic_markers,
        };

        Self {
            gateway,
            system_prompt: compose_system_prompt(&context, &options),
            canned,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn has_backend(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn request_for(&self, user_text: &str) -> CompletionRequest {
        CompletionRequest {
            system_prompt: self.system_prompt.clone(),
            user_message: user_text.to_string(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Produce the reply for one user message
    pub async fn respond(&self, user_text: &str, backend_available: bool) -> TurnOutcome {
        self.respond_for_session(None, user_text, backend_available).await
    }

    /// Produce the reply for one user message, tagging log lines with the session
    pub async fn respond_for_session(
        &self,
        session_id: Option<&str>,
        user_text: &str,
        backend_available: bool,
    ) -> TurnOutcome {
        let gateway = match (&self.gateway, backend_available) {
            (Some(gateway), true) => gateway,
            _ => {
                logging::log_routing(session_id, "Backend skipped, using canned replies");
                return TurnOutcome {
                    transitional: None,
                    reply: self.canned_reply(session_id, user_text),
                    backend_error: None,
                };
            }
        };

        logging::log_backend(
            session_id,
            &format!("Calling {} model={}", gateway.provider_name(), self.model),
        );

        match gateway.complete(&self.request_for(user_text)).await {
            Ok(text) => {
                let topic = classify(user_text);
                logging::log_routing(
                    session_id,
                    &format!(
                        "Generated reply, topic={}",
                        topic.map(|t| t.as_str()).unwrap_or("none")
                    ),
                );
                TurnOutcome {
                    transitional: None,
                    reply: Reply::generated(non_blank_reply(Some(text)), topic),
                    backend_error: None,
                }
            }
            Err(e) => {
                logging::log_error(
                    session_id,
                    &format!("{} call failed ({}): {}", gateway.provider_name(), e.kind(), e),
                );
                TurnOutcome {
                    transitional: Some(Reply::canned(TRANSITION_NOTICE, None)),
                    reply: self.canned_reply(session_id, user_text),
                    backend_error: Some(e),
                }
            }
        }
    }

    fn canned_reply(&self, session_id: Option<&str>, user_text: &str) -> Reply {
        let (reply, source) = fallback_reply(user_text, &self.canned);
        logging::log_fallback(
            session_id,
            &format!(
                "source={}, topic={}",
                source.as_str(),
                reply.topic.map(|t| t.as_str()).unwrap_or("none")
            ),
        );
        reply
    }
}
