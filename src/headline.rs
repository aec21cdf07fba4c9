// src/headline.rs
use serde::Serialize;

use crate::ingest::types::Candidate;

/// Client-facing record. Serialized as
/// `{id, title, timestamp, isLatest, source, url, category}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    pub id: String,
    pub title: String,
    pub timestamp: String,
    pub is_latest: bool,
    pub source: String,
    pub url: String,
    /// Always present; `General` when nothing more specific is known.
    pub category: String,
}

pub const TIMESTAMP_FORMAT: &str = "%b %d, %Y %I:%M %p UTC";

/// Pure: same candidate and position always give the same record.
pub fn format_headline(c: &Candidate, position: usize) -> Headline {
    Headline {
        id: position.to_string(),
        title: c.title.clone(),
        timestamp: c.published_at.format(TIMESTAMP_FORMAT).to_string(),
        is_latest: position == 1,
        source: c.source_name.clone(),
        url: c.url.clone(),
        category: c.category.unwrap_or_default().to_string(),
    }
}

/// Format in order, positions starting at 1.
pub fn format_queue(candidates: &[Candidate]) -> Vec<Headline> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format_headline(c, i + 1))
        .collect()
}
