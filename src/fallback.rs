// src/fallback.rs
//! Hand-curated headlines served when live sources fail or fall short.
//!
//! Each entry is stamped `now - (i + 1) * 2h`, so the catalog on its own is
//! already newest-first.

use chrono::{DateTime, Duration, Utc};

use crate::ingest::types::Candidate;
use crate::model::categorize::Category;

pub const OFFSET_STEP_HOURS: i64 = 2;

#[derive(Debug, Clone, Copy)]
pub struct FallbackEntry {
    pub title: &'static str,
    pub source: &'static str,
    pub url: &'static str,
    pub category: Category,
}

pub const CATALOG: [FallbackEntry; 7] = [
    FallbackEntry {
        title: "OpenAI Announces Major Updates to GPT-4",
        source: "OpenAI Blog",
        url: "https://openai.com/blog",
        category: Category::Product,
    },
    FallbackEntry {
        title: "Google DeepMind Achieves Breakthrough in AI Research",
        source: "Google DeepMind",
        url: "https://deepmind.google/discover/blog/",
        category: Category::Research,
    },
    FallbackEntry {
        title: "Microsoft Enhances Azure AI Capabilities",
        source: "Microsoft News",
        url: "https://news.microsoft.com/source/topics/ai/",
        category: Category::Product,
    },
    FallbackEntry {
        title: "AI Ethics Board Releases New Guidelines",
        source: "AI Policy Watch",
        url: "",
        category: Category::Policy,
    },
    FallbackEntry {
        title: "Meta's AI Research Shows Promise in Language Understanding",
        source: "Meta AI",
        url: "https://ai.meta.com/blog/",
        category: Category::Research,
    },
    FallbackEntry {
        title: "NVIDIA Expands AI Chip Production to Meet Demand",
        source: "NVIDIA Newsroom",
        url: "https://nvidianews.nvidia.com/",
        category: Category::Industry,
    },
    FallbackEntry {
        title: "AI Startups Attract Record Venture Funding",
        source: "Tech Funding Daily",
        url: "",
        category: Category::Funding,
    },
];

/// The whole catalog as candidates, in catalog order.
pub fn catalog_candidates(now: DateTime<Utc>) -> Vec<Candidate> {
    CATALOG
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let offset = Duration::hours(OFFSET_STEP_HOURS * (i as i64 + 1));
            let mut c = Candidate::new(e.title, e.source, now - offset).with_url(e.url);
            c.category = Some(e.category);
            c
        })
        .collect()
}
