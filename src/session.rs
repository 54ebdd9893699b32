//! Per-session conversation state.
//!
//! Everything a session remembers lives in `SessionState`: the message
//! history, explored topics, the guided journey position, the backend mode
//! and the turn counter used to drop stale replies. The orchestrator never
//! touches it; callers begin a turn here, ask the orchestrator, then commit
//! the outcome back.

use crate::fallback::Reply;
use crate::orchestrator::TurnOutcome;
use crate::topic::TopicCategory;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

const FOLLOW_UP_HINT: &str = "Not sure where to begin? Try asking: \"Tell me about your work experience\"";

const JOURNEY_INTRO: &str = "Welcome! Let me take you through my professional journey. I'll walk you through my experience, skills, projects, and more. Let's begin!";

const JOURNEY_COMPLETE: &str = "That's my story! Thanks for taking the time to learn about me. Feel free to ask any questions or explore more on your own.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    id: String,
    sender: Sender,
    text: String,
    topic: Option<TopicCategory>,
    is_generated: bool,
    is_transient: bool,
    timestamp: String,
}

impl ConversationMessage {
    fn build(
        sender: Sender,
        text: String,
        topic: Option<TopicCategory>,
        is_generated: bool,
        is_transient: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            text,
            topic,
            is_generated,
            is_transient,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::build(Sender::User, text.into(), None, false, false)
    }

    pub fn bot(reply: Reply) -> Self {
        Self::build(Sender::Bot, reply.text, reply.topic, reply.is_generated, false)
    }

    pub fn bot_text(text: impl Into<String>, topic: Option<TopicCategory>) -> Self {
        Self::build(Sender::Bot, text.into(), topic, false, false)
    }

    /// Bot hint the presentation layer may style differently or drop.
    pub fn transient(text: impl Into<String>) -> Self {
        Self::build(Sender::Bot, text.into(), None, false, true)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn topic(&self) -> Option<TopicCategory> {
        self.topic
    }

    pub fn is_generated(&self) -> bool {
        self.is_generated
    }

    pub fn is_transient(&self) -> bool {
        self.is_transient
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    Selecting,
    Explore,
    Journey,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Selecting => "selecting",
            ChatMode::Explore => "explore",
            ChatMode::Journey => "journey",
        }
    }

    pub fn from_str(s: &str) -> Option<ChatMode> {
        match s.trim().to_lowercase().as_str() {
            "selecting" => Some(ChatMode::Selecting),
            "explore" => Some(ChatMode::Explore),
            "journey" => Some(ChatMode::Journey),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    Enabled,
    /// Not configured when the session started.
    Disabled,
    /// Failed earlier in this session and is skipped from now on.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TurnTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub text: &'static str,
    pub short_text: &'static str,
    pub topic: TopicCategory,
}

pub static SUGGESTIONS: [Suggestion; 6] = [
    Suggestion {
        text: "Tell me about your experience",
        short_text: "Experience",
        topic: TopicCategory::Experience,
    },
    Suggestion {
        text: "What skills do you have?",
        short_text: "Skills",
        topic: TopicCategory::Skills,
    },
    Suggestion {
        text: "Show me your projects",
        short_text: "Projects",
        topic: TopicCategory::Projects,
    },
    Suggestion {
        text: "What certifications do you have?",
        short_text: "Certifications",
        topic: TopicCategory::Certifications,
    },
    Suggestion {
        text: "Tell me about your education",
        short_text: "Education",
        topic: TopicCategory::Education,
    },
    Suggestion {
        text: "Any volunteering experience?",
        short_text: "Volunteering",
        topic: TopicCategory::Volunteering,
    },
];

pub fn suggestion_for(topic: TopicCategory) -> &'static Suggestion {
    // SUGGESTIONS holds one entry per topic in canonical order.
    &SUGGESTIONS[topic as usize]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JourneyStep {
    pub topic: TopicCategory,
    pub question: &'static str,
    pub intro: &'static str,
}

pub static JOURNEY_STEPS: [JourneyStep; 6] = [
    JourneyStep {
        topic: TopicCategory::Experience,
        question: "Tell me about your work experience",
        intro: "Let's start with my professional journey. Here's where I've worked and what I've accomplished:",
    },
    JourneyStep {
        topic: TopicCategory::Skills,
        question: "What are your key skills?",
        intro: "Throughout my career, I've developed a diverse set of skills. Here's what I bring to the table:",
    },
    JourneyStep {
        topic: TopicCategory::Projects,
        question: "Show me your projects",
        intro: "I love building things. Here are some projects I'm proud of:",
    },
    JourneyStep {
        topic: TopicCategory::Certifications,
        question: "What certifications do you have?",
        intro: "Continuous learning is important to me. Here are my certifications:",
    },
    JourneyStep {
        topic: TopicCategory::Education,
        question: "Tell me about your education",
        intro: "Here's my educational background:",
    },
    JourneyStep {
        topic: TopicCategory::Volunteering,
        question: "What community involvement do you have?",
        intro: "Giving back to the community matters to me. Here's how I've contributed:",
    },
];

/// Result of returning to an already discussed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicReturn {
    /// An earlier message already shows the topic; points at its id.
    Existing(String),
    Appended(ConversationMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionAction {
    Returned(TopicReturn),
    /// Topic not explored yet: send this text as a user message.
    Ask(&'static str),
}

fn welcome_message(owner_name: &str) -> String {
    format!(
        "Hi there! I'm {}, welcome to my interactive portfolio.\nYou can ask about my experience, skills, projects, certifications, education, or community involvement, or just click a quick prompt below to get started.\n\nCurious about what I've built, where I've studied, or how I've made an impact? Just ask.",
        owner_name
    )
}

#[derive(Debug, Clone)]
pub struct SessionState {
    owner_name: String,
    mode: ChatMode,
    backend: BackendMode,
    messages: Vec<ConversationMessage>,
    explored_topics: BTreeSet<TopicCategory>,
    active_topic: Option<TopicCategory>,
    latest_turn: u64,
    transition_notice_shown: bool,
    journey_step: usize,
    journey_complete: bool,
}

impl SessionState {
    /// `backend_configured` is read once here and fixes the starting mode.
    pub fn new(owner_name: &str, backend_configured: bool) -> Self {
        Self {
            owner_name: owner_name.to_string(),
            mode: ChatMode::Selecting,
            backend: if backend_configured {
                BackendMode::Enabled
            } else {
                BackendMode::Disabled
            },
            messages: Vec::new(),
            explored_topics: BTreeSet::new(),
            active_topic: None,
            latest_turn: 0,
            transition_notice_shown: false,
            journey_step: 0,
            journey_complete: false,
        }
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn backend_mode(&self) -> BackendMode {
        self.backend
    }

    pub fn backend_available(&self) -> bool {
        self.backend == BackendMode::Enabled
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn explored_topics(&self) -> &BTreeSet<TopicCategory> {
        &self.explored_topics
    }

    pub fn active_topic(&self) -> Option<TopicCategory> {
        self.active_topic
    }

    pub fn journey_step(&self) -> usize {
        self.journey_step
    }

    pub fn is_journey_complete(&self) -> bool {
        self.journey_complete
    }

    fn push(&mut self, message: ConversationMessage) -> ConversationMessage {
        if let Some(topic) = message.topic {
            self.explored_topics.insert(topic);
            self.active_topic = Some(topic);
        }
        self.messages.push(message.clone());
        message
    }

    /// Welcome message plus the follow-up hint.
    pub fn start_explore(&mut self) -> Vec<ConversationMessage> {
        self.mode = ChatMode::Explore;
        let welcome = welcome_message(&self.owner_name);
        vec![
            self.push(ConversationMessage::bot_text(welcome, None)),
            self.push(ConversationMessage::transient(FOLLOW_UP_HINT)),
        ]
    }

    /// Journey intro plus the first step.
    pub fn start_journey(&mut self) -> Vec<ConversationMessage> {
        self.mode = ChatMode::Journey;
        self.journey_step = 0;
        self.journey_complete = false;

        let first = &JOURNEY_STEPS[0];
        vec![
            self.push(ConversationMessage::bot_text(JOURNEY_INTRO, None)),
            self.push(ConversationMessage::bot_text(first.intro, Some(first.topic))),
        ]
    }

    pub fn current_journey_step(&self) -> Option<&'static JourneyStep> {
        if self.mode != ChatMode::Journey || self.journey_complete {
            return None;
        }
        JOURNEY_STEPS.get(self.journey_step)
    }

    /// Advance the journey; the step after the last one completes it.
    /// Outside an unfinished journey this emits nothing.
    pub fn continue_journey(&mut self) -> Vec<ConversationMessage> {
        if self.mode != ChatMode::Journey || self.journey_complete {
            return Vec::new();
        }

        let next = self.journey_step + 1;
        match JOURNEY_STEPS.get(next) {
            Some(step) => {
                self.journey_step = next;
                vec![self.push(ConversationMessage::bot_text(step.intro, Some(step.topic)))]
            }
            None => {
                self.journey_complete = true;
                vec![self.push(ConversationMessage::bot_text(JOURNEY_COMPLETE, None))]
            }
        }
    }

    /// Record the user's message and hand out a ticket for the reply.
    /// Blank input starts no turn.
    pub fn begin_turn(&mut self, text: &str) -> Option<(TurnTicket, ConversationMessage)> {
        if text.trim().is_empty() {
            return None;
        }
        self.latest_turn += 1;
        let message = self.push(ConversationMessage::user(text));
        Some((TurnTicket(self.latest_turn), message))
    }

    pub fn is_latest(&self, ticket: TurnTicket) -> bool {
        ticket.0 == self.latest_turn
    }

    /// Apply a turn's outcome. Returns `None` when a newer turn has started;
    /// a backend failure is still remembered in that case.
    pub fn commit_turn(
        &mut self,
        ticket: TurnTicket,
        outcome: &TurnOutcome,
        sticky_failure: bool,
    ) -> Option<Vec<ConversationMessage>> {
        if outcome.backend_failed() && sticky_failure && self.backend == BackendMode::Enabled {
            self.backend = BackendMode::Failed;
        }

        if !self.is_latest(ticket) {
            return None;
        }

        let mut emitted = Vec::with_capacity(2);
        if let Some(notice) = &outcome.transitional {
            if !self.transition_notice_shown {
                self.transition_notice_shown = true;
                emitted.push(self.push(ConversationMessage::bot(notice.clone())));
            }
        }
        emitted.push(self.push(ConversationMessage::bot(outcome.reply.clone())));

        Some(emitted)
    }

    /// Point at the latest message showing `topic`, or append a return line.
    pub fn return_to_topic(&mut self, topic: TopicCategory) -> TopicReturn {
        self.active_topic = Some(topic);

        if let Some(existing) = self.messages.iter().rev().find(|m| m.topic == Some(topic)) {
            return TopicReturn::Existing(existing.id.clone());
        }

        let text = format!("Returning to our conversation about my {}:", topic.as_str());
        TopicReturn::Appended(self.push(ConversationMessage::bot_text(text, Some(topic))))
    }

    pub fn click_suggestion(&mut self, topic: TopicCategory) -> SuggestionAction {
        if self.explored_topics.contains(&topic) {
            SuggestionAction::Returned(self.return_to_topic(topic))
        } else {
            SuggestionAction::Ask(suggestion_for(topic).text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::orchestrator::TRANSITION_NOTICE;

    fn failed_outcome(text: &str, topic: Option<TopicCategory>) -> TurnOutcome {
        TurnOutcome {
            transitional: Some(Reply::canned(TRANSITION_NOTICE, None)),
            reply: Reply::canned(text, topic),
            backend_error: Some(BackendError::Auth("bad key".into())),
        }
    }

    fn ok_outcome(text: &str, topic: Option<TopicCategory>) -> TurnOutcome {
        TurnOutcome {
            transitional: None,
            reply: Reply::generated(text, topic),
            backend_error: None,
        }
    }

    #[test]
    fn test_only_bot_messages_carry_topic() {
        let user = ConversationMessage::user("hi");
        assert_eq!(user.sender(), Sender::User);
        assert_eq!(user.topic(), None);
        assert!(!user.is_generated());

        let bot = ConversationMessage::bot(Reply::generated("hello", Some(TopicCategory::Skills)));
        assert_eq!(bot.sender(), Sender::Bot);
        assert_eq!(bot.topic(), Some(TopicCategory::Skills));
        assert!(bot.is_generated());
        assert_ne!(bot.id(), user.id());
        assert!(chrono::DateTime::parse_from_rfc3339(bot.timestamp()).is_ok());
    }

    #[test]
    fn test_explore_start() {
        let mut state = SessionState::new("Alex", false);
        assert_eq!(state.mode(), ChatMode::Selecting);
        let emitted = state.start_explore();
        assert_eq!(state.mode(), ChatMode::Explore);
        assert_eq!(emitted.len(), 2);
        assert!(emitted[0].text().starts_with("Hi there! I'm Alex, welcome"));
        assert!(emitted[1].is_transient());
        assert!(state.explored_topics().is_empty());
    }

    #[test]
    fn test_journey_walks_all_steps_then_completes() {
        let mut state = SessionState::new("Alex", false);
        let emitted = state.start_journey();
        assert_eq!(emitted[0].text(), JOURNEY_INTRO);
        assert_eq!(emitted[1].topic(), Some(TopicCategory::Experience));
        assert_eq!(state.current_journey_step().map(|s| s.topic), Some(TopicCategory::Experience));

        for step in &JOURNEY_STEPS[1..] {
            let emitted = state.continue_journey();
            assert_eq!(emitted.len(), 1);
            assert_eq!(emitted[0].topic(), Some(step.topic));
            assert_eq!(emitted[0].text(), step.intro);
        }
        assert_eq!(state.explored_topics().len(), 6);

        let done = state.continue_journey();
        assert_eq!(done[0].text(), JOURNEY_COMPLETE);
        assert!(state.is_journey_complete());
        assert!(state.current_journey_step().is_none());
        assert!(state.continue_journey().is_empty());
    }

    #[test]
    fn test_continue_outside_journey_is_noop() {
        let mut state = SessionState::new("Alex", false);
        state.start_explore();
        assert!(state.continue_journey().is_empty());
    }

    #[test]
    fn test_blank_input_starts_no_turn() {
        let mut state = SessionState::new("Alex", true);
        assert!(state.begin_turn("   \n").is_none());
        assert!(state.messages().is_empty());
    }

    #[test]
    fn test_commit_marks_topic_explored() {
        let mut state = SessionState::new("Alex", true);
        let (ticket, _) = state.begin_turn("What skills?").unwrap();
        let emitted = state
            .commit_turn(ticket, &ok_outcome("Lots.", Some(TopicCategory::Skills)), true)
            .unwrap();
        assert_eq!(emitted.len(), 1);
        assert!(emitted[0].is_generated());
        assert_eq!(state.active_topic(), Some(TopicCategory::Skills));
        assert!(state.explored_topics().contains(&TopicCategory::Skills));
        assert_eq!(state.messages().len(), 2);
    }

    #[test]
    fn test_sticky_failure_and_single_notice() {
        let mut state = SessionState::new("Alex", true);
        let (ticket, _) = state.begin_turn("education?").unwrap();
        let emitted = state
            .commit_turn(ticket, &failed_outcome("canned", Some(TopicCategory::Education)), true)
            .unwrap();
        assert_eq!(emitted.len(), 2);
        assert_eq!(emitted[0].text(), TRANSITION_NOTICE);
        assert!(!emitted[1].is_generated());
        assert_eq!(state.backend_mode(), BackendMode::Failed);
        assert!(!state.backend_available());

        let (ticket, _) = state.begin_turn("again").unwrap();
        let emitted = state.commit_turn(ticket, &failed_outcome("canned", None), true).unwrap();
        assert_eq!(emitted.len(), 1);
    }

    #[test]
    fn test_non_sticky_failure_keeps_backend() {
        let mut state = SessionState::new("Alex", true);
        let (ticket, _) = state.begin_turn("education?").unwrap();
        state.commit_turn(ticket, &failed_outcome("canned", None), false);
        assert_eq!(state.backend_mode(), BackendMode::Enabled);
    }

    #[test]
    fn test_disabled_backend_stays_disabled() {
        let mut state = SessionState::new("Alex", false);
        assert_eq!(state.backend_mode(), BackendMode::Disabled);
        let (ticket, _) = state.begin_turn("hi").unwrap();
        state.commit_turn(ticket, &failed_outcome("canned", None), true);
        assert_eq!(state.backend_mode(), BackendMode::Disabled);
    }

    #[test]
    fn test_stale_turn_is_dropped_but_failure_remembered() {
        let mut state = SessionState::new("Alex", true);
        let (first, _) = state.begin_turn("first").unwrap();
        let (second, _) = state.begin_turn("second").unwrap();
        assert!(first < second);

        assert!(state.commit_turn(first, &failed_outcome("late", None), true).is_none());
        assert_eq!(state.backend_mode(), BackendMode::Failed);
        assert!(state.messages().iter().all(|m| m.text() != "late"));

        let emitted = state.commit_turn(second, &ok_outcome("fresh", None), true).unwrap();
        assert_eq!(emitted[0].text(), "fresh");
    }

    #[test]
    fn test_return_to_topic() {
        let mut state = SessionState::new("Alex", false);
        match state.return_to_topic(TopicCategory::Projects) {
            TopicReturn::Appended(msg) => {
                assert_eq!(msg.text(), "Returning to our conversation about my projects:");
                assert_eq!(msg.topic(), Some(TopicCategory::Projects));
            }
            other => panic!("expected appended message, got {:?}", other),
        }

        let last_id = state.messages().last().unwrap().id().to_string();
        assert_eq!(state.return_to_topic(TopicCategory::Projects), TopicReturn::Existing(last_id));
        assert_eq!(state.messages().len(), 1);
    }

    #[test]
    fn test_suggestion_asks_then_returns() {
        let mut state = SessionState::new("Alex", false);
        assert_eq!(
            state.click_suggestion(TopicCategory::Volunteering),
            SuggestionAction::Ask("Any volunteering experience?")
        );

        let (ticket, _) = state.begin_turn("Any volunteering experience?").unwrap();
        let outcome = ok_outcome("Food bank.", Some(TopicCategory::Volunteering));
        state.commit_turn(ticket, &outcome, true);

        assert!(matches!(
            state.click_suggestion(TopicCategory::Volunteering),
            SuggestionAction::Returned(TopicReturn::Existing(_))
        ));
    }

    #[test]
    fn test_suggestions_cover_each_topic_once() {
        for topic in TopicCategory::ALL {
            assert_eq!(suggestion_for(topic).topic, topic);
        }
    }

    #[test]
    fn test_chat_mode_round_trip_names() {
        assert_eq!(ChatMode::from_str(" Journey "), Some(ChatMode::Journey));
        assert_eq!(ChatMode::from_str("browse"), None);
        assert_eq!(ChatMode::Explore.as_str(), "explore");
    }
}
