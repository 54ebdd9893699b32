//! Content repository: the read-only portfolio records grouped by topic.

use crate::error::DataError;
use crate::topic::TopicCategory;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Glyphs that mark a description paragraph as a sub-heading.
const HEADING_MARKERS: [char; 4] = ['•', '▪', '➤', '★'];

/// Sample dataset bundled with the crate.
pub const SAMPLE_CONTENT_JSON: &str = include_str!("../data/portfolio.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    pub category: TopicCategory,
    pub title: String,
    pub subtitle: String,
    pub date_range: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub external_link: Option<String>,
    pub image_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub is_heading: bool,
}

fn to_paragraph(text: &str) -> Paragraph {
    match text.strip_prefix(&HEADING_MARKERS[..]) {
        Some(rest) => Paragraph {
            text: rest.trim_start().to_string(),
            is_heading: true,
        },
        None => Paragraph {
            text: text.to_string(),
            is_heading: false,
        },
    }
}

impl ContentRecord {
    /// Description split on blank lines, with sub-heading markers recognised.
    /// A line holding only whitespace counts as blank, and CRLF endings are
    /// accepted.
    pub fn paragraphs(&self) -> Vec<Paragraph> {
        let mut blocks: Vec<Vec<&str>> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in self.description.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
            } else {
                current.push(line.trim_end());
            }
        }
        if !current.is_empty() {
            blocks.push(current);
        }

        blocks
            .into_iter()
            .map(|lines| to_paragraph(lines.join("\n").trim()))
            .collect()
    }

    /// First `limit` tags plus how many were left out.
    pub fn display_tags(&self, limit: usize) -> (&[String], usize) {
        let shown = limit.min(self.tags.len());
        (&self.tags[..shown], self.tags.len() - shown)
    }
}

// Wire shape of a record inside the grouped JSON document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    id: String,
    #[serde(default, alias = "type")]
    category: Option<TopicCategory>,
    title: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default, alias = "dates")]
    date_range: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, alias = "link")]
    external_link: Option<String>,
    #[serde(default, alias = "imageUrl")]
    image_ref: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContentRepository {
    records: BTreeMap<TopicCategory, Vec<ContentRecord>>,
}

impl ContentRepository {
    /// Build from records, keeping their relative order within each category.
    pub fn from_records(records: Vec<ContentRecord>) -> Result<Self, DataError> {
        let mut seen = HashSet::new();
        let mut grouped: BTreeMap<TopicCategory, Vec<ContentRecord>> = BTreeMap::new();

        for record in records {
            if !seen.insert(record.id.clone()) {
                return Err(DataError::Invalid(format!("duplicate record id '{}'", record.id)));
            }
            grouped.entry(record.category).or_default().push(record);
        }

        Ok(Self { records: grouped })
    }

    /// Parse a document shaped like `{"experience": [...], "skills": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let raw: BTreeMap<String, Vec<RawRecord>> = serde_json::from_str(json)?;
        let mut records = Vec::new();

        for (group, entries) in raw {
            let category = TopicCategory::from_str(&group)
                .ok_or_else(|| DataError::Invalid(format!("unknown category '{}'", group)))?;

            for entry in entries {
                if let Some(declared) = entry.category {
                    if declared != category {
                        return Err(DataError::Invalid(format!(
                            "record '{}' declares category '{}' but is listed under '{}'",
                            entry.id, declared, category
                        )));
                    }
                }
                records.push(ContentRecord {
                    id: entry.id,
                    category,
                    title: entry.title,
                    subtitle: entry.subtitle,
                    date_range: entry.date_range.filter(|d| !d.trim().is_empty()),
                    description: entry.description,
                    tags: entry.tags,
                    external_link: entry.external_link,
                    image_ref: entry.image_ref,
                });
            }
        }

        Self::from_records(records)
    }

    pub fn load(path: &Path) -> Result<Self, DataError> {
        let json = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn sample() -> Result<Self, DataError> {
        Self::from_json(SAMPLE_CONTENT_JSON)
    }

    /// Records for one topic, in load order. Empty when the topic has none.
    pub fn records_for(&self, topic: TopicCategory) -> &[ContentRecord] {
        self.records.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every record, grouped in canonical category order.
    pub fn iter(&self) -> impl Iterator<Item = &ContentRecord> {
        TopicCategory::ALL
            .into_iter()
            .flat_map(move |topic| self.records_for(topic).iter())
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
