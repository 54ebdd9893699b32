//! Prompt composition for the language model backend.
//!
//! The context is a plain-text rendering of every content record followed by
//! the canned question/answer pairs, so the backend answers from the same
//! material the deterministic fallback uses.

use crate::canned::CannedResponseTable;
use crate::content::{ContentRecord, ContentRepository};
use crate::topic::TopicCategory;

const NO_DATES: &str = "No dates provided";

#[derive(Debug, Clone)]
pub struct PromptOptions {
    pub owner_name: String,
    /// Ask the backend to emit `[SHOW_<TOPIC>]` markers.
    pub topic_markers: bool,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            owner_name: "the portfolio owner".to_string(),
            topic_markers: true,
        }
    }
}

fn title_connector(topic: TopicCategory) -> Option<&'static str> {
    match topic {
        TopicCategory::Experience | TopicCategory::Volunteering => Some("at"),
        TopicCategory::Certifications | TopicCategory::Education => Some("from"),
        TopicCategory::Skills | TopicCategory::Projects => None,
    }
}

fn tag_label(topic: TopicCategory) -> &'static str {
    match topic {
        TopicCategory::Experience => "Skills",
        TopicCategory::Skills => "Related",
        TopicCategory::Projects => "Technologies",
        TopicCategory::Certifications => "Related",
        TopicCategory::Education => "Focus",
        TopicCategory::Volunteering => "Areas",
    }
}

fn render_record(record: &ContentRecord, out: &mut String) {
    let dates = record.date_range.as_deref().unwrap_or(NO_DATES);
    let title_line = match title_connector(record.category) {
        Some(connector) => format!(
            "- {} {} {} ({})\n",
            record.title, connector, record.subtitle, dates
        ),
        None => format!("- {} ({}) ({})\n", record.title, record.subtitle, dates),
    };
    out.push_str(&title_line);
    out.push_str(&format!("  {}\n", record.description));

    if !record.tags.is_empty() {
        out.push_str(&format!("  {}: {}\n", tag_label(record.category), record.tags.join(", ")));
    }
    if record.category == TopicCategory::Projects {
        if let Some(link) = &record.external_link {
            out.push_str(&format!("  Link: {}\n", link));
        }
    }
    out.push('\n');
}

/// Render the whole repository and canned table as grounding context.
pub fn compose_context(repository: &ContentRepository, canned: &CannedResponseTable) -> String {
    let mut context = String::new();

    for topic in TopicCategory::ALL {
        context.push_str(&format!("## {}\n", topic.heading()));
        for record in repository.records_for(topic) {
            render_record(record, &mut context);
        }
    }

    context.push_str("## COMMON QUESTIONS AND ANSWERS\n");
    for entry in canned.entries() {
        context.push_str(&format!("- Questions about: {}\n", entry.keywords.join(", ")));
        context.push_str(&format!("  Answer: {}\n\n", entry.reply_text));
    }

    context
}

fn marker_directives() -> String {
    let mut rules = String::from("SPECIAL FORMATTING RULES:\n");
    for topic in TopicCategory::ALL {
        rules.push_str(&format!(
            "- When asked about {}, respond with ONLY a brief intro sentence (1-2 sentences max) followed by \"{}\" on a new line.\n",
            topic.heading(),
            topic.marker()
        ));
    }

    let examples: [(TopicCategory, &str); 6] = [
        (TopicCategory::Experience, "Here's where I've worked and what I've accomplished:"),
        (TopicCategory::Skills, "Here are my key skills and expertise areas:"),
        (TopicCategory::Projects, "Here are some projects I'm proud of:"),
        (
            TopicCategory::Certifications,
            "I've earned several certifications to validate my expertise:",
        ),
        (TopicCategory::Education, "Here's my educational background:"),
        (TopicCategory::Volunteering, "I'm passionate about giving back to the community:"),
    ];
    for (topic, intro) in examples {
        rules.push_str(&format!(
            "- Example for {}: \"{}\\n{}\"\n",
            topic.as_str(),
            intro,
            topic.marker()
        ));
    }
    rules.push_str(
        "- For all other questions, provide detailed conversational responses using the information below.\n\n",
    );
    rules
}

/// Wrap `context` in the behavioural instructions sent as the system prompt.
pub fn compose_system_prompt(context: &str, options: &PromptOptions) -> String {
    let owner = options.owner_name.as_str();
    let formatting = if options.topic_markers {
        marker_directives()
    } else {
        String::new()
    };

    format!(
        r#"You are an assistant for {owner}'s portfolio website. Your purpose is to answer questions ONLY about {owner}'s background, experience, skills, projects, education, certifications, and volunteering work.

IMPORTANT INSTRUCTIONS:
1. ONLY answer questions based on the information provided below.
2. If asked about topics not covered in {owner}'s portfolio, politely explain that you can only provide information about {owner}'s professional background and portfolio.
3. Maintain a professional, friendly tone.
4. Keep responses concise and focused.
5. If you're unsure about specific details, acknowledge the limitations of your knowledge rather than making up information.
6. Never mention that you are an automated system or where your information comes from - just respond naturally as a representative of {owner}'s portfolio.
7. When asked about technologies, tools, or tech stack used in projects, provide specific details from the project descriptions and tags.
8. For questions about skills or technologies, reference both the Skills section and the relevant technologies mentioned in Projects.

{formatting}HERE IS {owner}'S PORTFOLIO INFORMATION:
{context}
Remember to only use the information provided above when answering questions."#
    )
}
