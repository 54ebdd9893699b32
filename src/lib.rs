pub mod anthropic;
pub mod canned;
pub mod classifier;
pub mod config;
pub mod content;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod logging;
pub mod openai;
pub mod orchestrator;
pub mod prompts;
pub mod session;
pub mod topic;

pub use canned::{CannedResponseEntry, CannedResponseTable};
pub use classifier::classify;
pub use config::{ChatConfig, Provider};
pub use content::{ContentRecord, ContentRepository};
pub use error::{BackendError, ConfigError, DataError, InitError};
pub use fallback::Reply;
pub use gateway::{CompletionRequest, LanguageModelGateway};
pub use orchestrator::{Orchestrator, TurnOutcome};
pub use session::{BackendMode, ChatMode, ConversationMessage, SessionState, Suggestion};
pub use topic::TopicCategory;

use serde::Serialize;
use session::{SuggestionAction, TopicReturn, SUGGESTIONS};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub configured: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResult {
    /// False when the input was blank or a newer turn superseded this one.
    pub applied: bool,
    pub messages: Vec<ConversationMessage>,
    pub topic: Option<TopicCategory>,
    /// Existing message the presentation layer should bring into view.
    pub focus_message_id: Option<String>,
}

impl SendMessageResult {
    fn ignored() -> Self {
        Self {
            applied: false,
            messages: Vec::new(),
            topic: None,
            focus_message_id: None,
        }
    }

    fn from_topic_return(topic: TopicCategory, returned: TopicReturn) -> Self {
        match returned {
            TopicReturn::Existing(id) => Self {
                applied: true,
                messages: Vec::new(),
                topic: Some(topic),
                focus_message_id: Some(id),
            },
            TopicReturn::Appended(message) => Self {
                applied: true,
                messages: vec![message],
                topic: Some(topic),
                focus_message_id: None,
            },
        }
    }
}

/// One visitor's conversation. The lock is held only between awaits.
pub struct ChatSession {
    id: String,
    state: Mutex<SessionState>,
}

impl ChatSession {
    fn new(state: SessionState) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            state: Mutex::new(state),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<ConversationMessage> {
        self.lock().messages().to_vec()
    }
}

pub struct FolioChat {
    config: ChatConfig,
    repository: ContentRepository,
    orchestrator: Orchestrator,
}

impl FolioChat {
    // ============ App Initialization ============

    /// Load data, start logging and build the backend client.
    pub fn init_app(config: ChatConfig) -> Result<Self, DataError> {
        if let Some(dir) = &config.log_dir {
            if let Err(e) = logging::init_logging(dir) {
                eprintln!("Failed to initialize logging: {}", e);
            }
            // Keep the last 7 days
            let _ = logging::cleanup_old_logs(dir);
        }

        let repository = match &config.content_path {
            Some(path) => ContentRepository::load(path)?,
            None => ContentRepository::sample()?,
        };
        let canned = match &config.canned_path {
            Some(path) => CannedResponseTable::load(path)?,
            None => CannedResponseTable::sample()?,
        };

        let gateway = gateway::build_gateway(&config);

        logging::log_session(
            None,
            &format!(
                "App initialized: {} records, {} canned replies, backend={}",
                repository.len(),
                canned.entries().len(),
                gateway.as_ref().map(|g| g.provider_name()).unwrap_or("none")
            ),
        );

        Ok(Self::from_parts(config, repository, canned, gateway))
    }

    pub fn init_from_env() -> Result<Self, InitError> {
        let config = ChatConfig::from_env()?;
        Ok(Self::init_app(config)?)
    }

    /// Assemble from already loaded parts.
    pub fn from_parts(
        config: ChatConfig,
        repository: ContentRepository,
        canned: CannedResponseTable,
        gateway: Option<Arc<dyn LanguageModelGateway>>,
    ) -> Self {
        let orchestrator = Orchestrator::new(gateway, &repository, Arc::new(canned), &config);
        Self {
            config,
            repository,
            orchestrator,
        }
    }

    pub fn backend_status(&self) -> BackendStatus {
        BackendStatus {
            configured: self.orchestrator.has_backend(),
        }
    }

    // ============ Sessions ============

    pub fn start_session(&self, mode: ChatMode) -> ChatSession {
        let session = ChatSession::new(SessionState::new(
            &self.config.owner_name,
            self.orchestrator.has_backend(),
        ));
        logging::log_session(
            Some(session.id()),
            &format!("Session started, mode={}", mode.as_str()),
        );
        self.select_mode(&session, mode);
        session
    }

    /// Enter explore or journey mode, returning the opening messages.
    pub fn select_mode(&self, session: &ChatSession, mode: ChatMode) -> Vec<ConversationMessage> {
        let mut state = session.lock();
        match mode {
            ChatMode::Selecting => Vec::new(),
            ChatMode::Explore => state.start_explore(),
            ChatMode::Journey => state.start_journey(),
        }
    }

    pub async fn send_message(&self, session: &ChatSession, text: &str) -> SendMessageResult {
        let (ticket, backend_available) = {
            let mut state = session.lock();
            let Some((ticket, _)) = state.begin_turn(text) else {
                return SendMessageResult::ignored();
            };
            (ticket, state.backend_available())
        };

        let outcome = self
            .orchestrator
            .respond_for_session(Some(session.id()), text, backend_available)
            .await;

        let committed = session
            .lock()
            .commit_turn(ticket, &outcome, self.config.sticky_backend_failure);

        match committed {
            Some(messages) => SendMessageResult {
                applied: true,
                messages,
                topic: outcome.reply.topic,
                focus_message_id: None,
            },
            None => {
                logging::log_session(Some(session.id()), "Dropped reply from a superseded turn");
                SendMessageResult::ignored()
            }
        }
    }

    pub async fn click_suggestion(
        &self,
        session: &ChatSession,
        topic: TopicCategory,
    ) -> SendMessageResult {
        let action = session.lock().click_suggestion(topic);
        match action {
            SuggestionAction::Returned(returned) => {
                SendMessageResult::from_topic_return(topic, returned)
            }
            SuggestionAction::Ask(text) => self.send_message(session, text).await,
        }
    }

    pub fn return_to_topic(
        &self,
        session: &ChatSession,
        topic: TopicCategory,
    ) -> SendMessageResult {
        let returned = session.lock().return_to_topic(topic);
        SendMessageResult::from_topic_return(topic, returned)
    }

    pub fn continue_journey(&self, session: &ChatSession) -> Vec<ConversationMessage> {
        session.lock().continue_journey()
    }

    // ============ Content ============

    pub fn records_for(&self, topic: TopicCategory) -> &[ContentRecord] {
        self.repository.records_for(topic)
    }

    pub fn suggestions(&self) -> &'static [Suggestion] {
        &SUGGESTIONS
    }
}
