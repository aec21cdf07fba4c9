// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::model::categorize::Category;

/// An unformatted news item produced by a source adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String, // normalized, never empty
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub source_name: String, // e.g., "TechCrunch", "NewsAPI: Reuters"
    pub url: String,         // may be empty
    pub relevance_score: u32,
    pub category: Option<Category>,
}

impl Candidate {
    pub fn new(
        title: impl Into<String>,
        source_name: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            published_at,
            source_name: source_name.into(),
            url: String::new(),
            relevance_score: 0,
            category: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Deduplication key: trimmed, lowercased title.
    pub fn dedup_key(&self) -> String {
        self.title.trim().to_lowercase()
    }
}

/// One external news origin. Errors are collapsed to "no candidates" by
/// [`crate::ingest::collect_candidates`]; callers above never see them.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Candidate>>;
    fn name(&self) -> &'static str;
}
