//! Deterministic replies used when the language model is unavailable or fails.

use crate::canned::CannedResponseTable;
use crate::classifier::{classify, contains_any};
use crate::topic::TopicCategory;
use serde::Serialize;

pub const GENERIC_REPLY: &str = "I can tell you about my experience, skills, projects, certifications, education, or community involvement. What would you like to know?";

const VOLUNTEERING_SHORTCUT: &[&str] = &["volunteer", "volunteering", "community involvement"];

const VOLUNTEERING_REPLY: &str = "Here's my community involvement and volunteering experience:";

/// Keyword cascade tried after the canned table misses. Order matters, and
/// technology phrasing lands on projects here (the classifier says skills).
const CASCADE: &[(&[&str], TopicCategory, &str)] = &[
    (
        &["technologies", "tech stack", "tools used"],
        TopicCategory::Projects,
        "Here are the technologies I've used in my projects:",
    ),
    (
        &["experience", "work"],
        TopicCategory::Experience,
        "Here's my professional experience:",
    ),
    (
        &["skills", "abilities", "top skills"],
        TopicCategory::Skills,
        "Here are my skills:",
    ),
    (
        &["projects", "portfolio", "latest project"],
        TopicCategory::Projects,
        "Here are some projects I've worked on:",
    ),
    (
        &["certifications", "certificates"],
        TopicCategory::Certifications,
        "Here are my certifications:",
    ),
    (
        &["education", "study", "degree", "school", "university", "studied"],
        TopicCategory::Education,
        "Here's my educational background:",
    ),
    (
        &["community", "charity", "impact"],
        TopicCategory::Volunteering,
        VOLUNTEERING_REPLY,
    ),
];

/// One bot reply as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub text: String,
    pub topic: Option<TopicCategory>,
    pub is_generated: bool,
}

impl Reply {
    pub fn canned(text: impl Into<String>, topic: Option<TopicCategory>) -> Self {
        Self {
            text: text.into(),
            topic,
            is_generated: false,
        }
    }

    pub fn generated(text: impl Into<String>, topic: Option<TopicCategory>) -> Self {
        Self {
            text: text.into(),
            topic,
            is_generated: true,
        }
    }
}

/// Where a fallback reply came from, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackSource {
    VolunteeringShortcut,
    Canned,
    Cascade,
    Generic,
}

impl FallbackSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackSource::VolunteeringShortcut => "volunteering_shortcut",
            FallbackSource::Canned => "canned",
            FallbackSource::Cascade => "cascade",
            FallbackSource::Generic => "generic",
        }
    }
}

fn mentions_project_use(lower: &str) -> bool {
    lower.contains("use") && lower.contains("project")
}

/// Pick the deterministic reply for `user_text`.
pub fn fallback_reply(user_text: &str, canned: &CannedResponseTable) -> (Reply, FallbackSource) {
    let lower = user_text.to_lowercase();

    if contains_any(&lower, VOLUNTEERING_SHORTCUT) {
        return (
            Reply::canned(VOLUNTEERING_REPLY, Some(TopicCategory::Volunteering)),
            FallbackSource::VolunteeringShortcut,
        );
    }

    if let Some(entry) = canned.find_match(user_text) {
        return (
            Reply::canned(entry.reply_text.clone(), classify(user_text)),
            FallbackSource::Canned,
        );
    }

    for (index, (triggers, topic, text)) in CASCADE.iter().enumerate() {
        let hit = contains_any(&lower, triggers) || (index == 0 && mentions_project_use(&lower));
        if hit {
            return (Reply::canned(*text, Some(*topic)), FallbackSource::Cascade);
        }
    }

    (Reply::canned(GENERIC_REPLY, None), FallbackSource::Generic)
}
