//! Canned response table: fixed replies selected by keyword.

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Canned replies bundled with the crate.
pub const SAMPLE_CANNED_JSON: &str = include_str!("../data/canned_responses.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CannedResponseEntry {
    pub keywords: Vec<String>,
    #[serde(rename = "response", alias = "replyText")]
    pub reply_text: String,
}

impl CannedResponseEntry {
    /// True when any keyword occurs in the already lower-cased text.
    fn matches_lowercase(&self, lowercase_text: &str) -> bool {
        self.keywords.iter().any(|kw| lowercase_text.contains(kw.as_str()))
    }
}

/// Ordered list of entries. Table order is the only tie-break.
#[derive(Debug, Clone, Default)]
pub struct CannedResponseTable {
    entries: Vec<CannedResponseEntry>,
}

impl CannedResponseTable {
    /// Keywords are lower-cased; entries without a usable keyword are rejected.
    pub fn new(entries: Vec<CannedResponseEntry>) -> Result<Self, DataError> {
        let mut normalized = Vec::with_capacity(entries.len());

        for (idx, entry) in entries.into_iter().enumerate() {
            if entry.keywords.is_empty() {
                return Err(DataError::Invalid(format!("canned entry {} has no keywords", idx)));
            }
            if entry.keywords.iter().any(|kw| kw.trim().is_empty()) {
                return Err(DataError::Invalid(format!("canned entry {} has a blank keyword", idx)));
            }
            normalized.push(CannedResponseEntry {
                keywords: entry.keywords.iter().map(|kw| kw.to_lowercase()).collect(),
                reply_text: entry.reply_text,
            });
        }

        Ok(Self { entries: normalized })
    }

    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let entries: Vec<CannedResponseEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    pub fn load(path: &Path) -> Result<Self, DataError> {
        let json = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn sample() -> Result<Self, DataError> {
        Self::from_json(SAMPLE_CANNED_JSON)
    }

    pub fn entries(&self) -> &[CannedResponseEntry] {
        &self.entries
    }

    /// First entry, in table order, with a keyword that is a case-insensitive
    /// substring of `user_text`.
    pub fn find_match(&self, user_text: &str) -> Option<&CannedResponseEntry> {
        let lower = user_text.to_lowercase();
        self.entries.iter().find(|entry| entry.matches_lowercase(&lower))
    }
}
