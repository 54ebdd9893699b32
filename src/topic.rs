use serde::{Deserialize, Serialize};

/// The six fixed content groupings of the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicCategory {
    Experience,
    Skills,
    Projects,
    Certifications,
    Education,
    Volunteering,
}

impl TopicCategory {
    /// Canonical category order, used for rendering and the guided journey.
    pub const ALL: [TopicCategory; 6] = [
        TopicCategory::Experience,
        TopicCategory::Skills,
        TopicCategory::Projects,
        TopicCategory::Certifications,
        TopicCategory::Education,
        TopicCategory::Volunteering,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TopicCategory::Experience => "experience",
            TopicCategory::Skills => "skills",
            TopicCategory::Projects => "projects",
            TopicCategory::Certifications => "certifications",
            TopicCategory::Education => "education",
            TopicCategory::Volunteering => "volunteering",
        }
    }

    pub fn from_str(s: &str) -> Option<TopicCategory> {
        match s.trim().to_lowercase().as_str() {
            "experience" => Some(TopicCategory::Experience),
            "skills" => Some(TopicCategory::Skills),
            "projects" => Some(TopicCategory::Projects),
            "certifications" => Some(TopicCategory::Certifications),
            "education" => Some(TopicCategory::Education),
            "volunteering" => Some(TopicCategory::Volunteering),
            _ => None,
        }
    }

    /// Section heading used in the composed context.
    pub fn heading(&self) -> &'static str {
        match self {
            TopicCategory::Experience => "EXPERIENCE",
            TopicCategory::Skills => "SKILLS",
            TopicCategory::Projects => "PROJECTS",
            TopicCategory::Certifications => "CERTIFICATIONS",
            TopicCategory::Education => "EDUCATION",
            TopicCategory::Volunteering => "VOLUNTEERING",
        }
    }

    /// Token the backend is asked to emit when a reply should open this topic's carousel.
    pub fn marker(&self) -> String {
        format!("[SHOW_{}]", self.heading())
    }
}

impl std::fmt::Display for TopicCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_str() {
        for topic in TopicCategory::ALL {
            assert_eq!(TopicCategory::from_str(topic.as_str()), Some(topic));
        }
        assert_eq!(TopicCategory::from_str(" Skills "), Some(TopicCategory::Skills));
        assert_eq!(TopicCategory::from_str("hobbies"), None);
    }

    #[test]
    fn test_marker_format() {
        assert_eq!(TopicCategory::Projects.marker(), "[SHOW_PROJECTS]");
        assert_eq!(TopicCategory::Volunteering.marker(), "[SHOW_VOLUNTEERING]");
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&TopicCategory::Certifications).unwrap();
        assert_eq!(json, "\"certifications\"");
        let parsed: TopicCategory = serde_json::from_str("\"education\"").unwrap();
        assert_eq!(parsed, TopicCategory::Education);
    }
}
