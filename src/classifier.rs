//! Topic classifier: maps free text to a content topic by keyword.
//!
//! Rules are checked top to bottom and the first hit wins. Specific
//! volunteering phrases come before every other topic. "technologies" and
//! "tech stack" are listed under both skills and projects; skills is checked
//! first, so ambiguous technology questions classify as skills.

use crate::topic::TopicCategory;

const VOLUNTEERING_PRIORITY: &[&str] = &[
    "volunteer",
    "community service",
    "charity work",
    "food bank",
    "vaccine ambassador",
    "community involvement",
];

const EXPERIENCE: &[&str] = &["experience", "work", "job", "career"];

const SKILLS: &[&str] = &[
    "skill",
    "abilities",
    "capable",
    "can do",
    "technologies",
    "tech stack",
    "programming",
    "tools",
];

const PROJECTS: &[&str] = &[
    "project",
    "portfolio",
    "built",
    "created",
    "technologies",
    "tech stack",
    "tech used",
    "tools used",
];

const CERTIFICATIONS: &[&str] = &["certification", "certificate", "credential", "qualified"];

const EDUCATION: &[&str] = &["education", "study", "degree", "school", "university", "college"];

// Broader volunteering phrasing, only reached when nothing more specific hit.
const VOLUNTEERING_BROAD: &[&str] = &[
    "volunteering",
    "community engagement",
    "charity",
    "nonprofit",
    "non-profit",
    "giving back",
];

const RULES: &[(TopicCategory, &[&str])] = &[
    (TopicCategory::Volunteering, VOLUNTEERING_PRIORITY),
    (TopicCategory::Experience, EXPERIENCE),
    (TopicCategory::Skills, SKILLS),
    (TopicCategory::Projects, PROJECTS),
    (TopicCategory::Certifications, CERTIFICATIONS),
    (TopicCategory::Education, EDUCATION),
    (TopicCategory::Volunteering, VOLUNTEERING_BROAD),
];

pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify `text` into at most one topic.
pub fn classify(text: &str) -> Option<TopicCategory> {
    let lower = text.to_lowercase();
    RULES
        .iter()
        .find(|(_, triggers)| contains_any(&lower, triggers))
        .map(|(topic, _)| *topic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volunteering_beats_other_topics() {
        for text in [
            "Do you volunteer?",
            "Tell me about your volunteering experience",
            "What skills did your community involvement teach you?",
            "Any VOLUNTEER work on your resume?",
        ] {
            assert_eq!(classify(text), Some(TopicCategory::Volunteering), "{}", text);
        }
    }

    #[test]
    fn test_technology_questions_tie_break_to_skills() {
        assert_eq!(classify("What technologies do you use?"), Some(TopicCategory::Skills));
        assert_eq!(classify("what's your tech stack"), Some(TopicCategory::Skills));
        assert_eq!(classify("which tech used in that app"), Some(TopicCategory::Projects));
    }

    #[test]
    fn test_each_topic_reachable() {
        assert_eq!(classify("Tell me about your career"), Some(TopicCategory::Experience));
        assert_eq!(classify("What are your abilities?"), Some(TopicCategory::Skills));
        assert_eq!(classify("Show me what you've built"), Some(TopicCategory::Projects));
        assert_eq!(classify("Are you qualified?"), Some(TopicCategory::Certifications));
        assert_eq!(classify("Where did you go to college?"), Some(TopicCategory::Education));
        assert_eq!(classify("Any charity involvement?"), Some(TopicCategory::Volunteering));
    }

    #[test]
    fn test_experience_checked_before_skills() {
        assert_eq!(
            classify("what skills did you use at your job"),
            Some(TopicCategory::Experience)
        );
    }

    #[test]
    fn test_unrelated_text_has_no_topic() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("what's the weather"), None);
        assert_eq!(classify("asdkjasd random text"), None);
    }

    #[test]
    fn test_deterministic() {
        let text = "Which certifications and degrees do you hold?";
        let first = classify(text);
        for _ in 0..10 {
            assert_eq!(classify(text), first);
        }
        assert_eq!(first, Some(TopicCategory::Certifications));
    }
}
