// src/config/ticker.rs
//! Ticker configuration loaded from `config/ticker.toml`.
//!
//! Every field has a default so a partial (or missing) file still yields a
//! runnable configuration. Values are sanitized after parsing.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TICKER_CONFIG_PATH: &str = "config/ticker.toml";
pub const ENV_TICKER_CONFIG_PATH: &str = "TICKER_CONFIG_PATH";

/// Upper bound for the synthesized-timestamp step (one day).
pub const MAX_SYNTHETIC_STEP_MINUTES: i64 = 24 * 60;
/// Upper bound for keyword weights.
pub const MAX_KEYWORD_WEIGHT: u32 = 1_000;

/// What the pipeline does on each refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    /// Fetch live sources, rank and select.
    #[default]
    Aggregate,
    /// Ask the text model for five headlines directly.
    Generate,
}

/// Which ordering/filtering the selector applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Newest first, no topical filter.
    #[default]
    Recency,
    /// Drop zero-score items, newest first, score breaks ties.
    Relevance,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedCfg {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchCfg {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub per_feed_cap: usize,
    pub global_cap: usize,
    /// Step between synthesized timestamps of undated feed items.
    pub synthetic_step_minutes: i64,
    pub user_agent: String,
}

impl Default for FetchCfg {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 2,
            retry_delay_ms: 500,
            per_feed_cap: 5,
            global_cap: 20,
            synthetic_step_minutes: 60,
            user_agent: "ai-news-ticker/0.1 (+rss reader)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsApiCfg {
    pub base_url: String,
    pub query: String,
    pub language: String,
    pub page_size: u32,
}

impl Default for NewsApiCfg {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2".to_string(),
            query: "artificial intelligence OR OpenAI OR \"machine learning\"".to_string(),
            language: "en".to_string(),
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelevanceCfg {
    pub keywords: Vec<String>,
    pub title_weight: u32,
    pub description_weight: u32,
    /// Keywords of at most this many characters must match a whole word
    /// ("ai" then skips "said" but also "OpenAI"). `0` keeps plain
    /// substring matching for every keyword.
    pub whole_word_max_len: usize,
}

impl Default for RelevanceCfg {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            title_weight: 3,
            description_weight: 1,
            whole_word_max_len: 0,
        }
    }
}

fn default_keywords() -> Vec<String> {
    [
        "ai",
        "artificial intelligence",
        "machine learning",
        "deep learning",
        "neural",
        "llm",
        "gpt",
        "chatgpt",
        "openai",
        "anthropic",
        "deepmind",
        "gemini",
        "generative",
        "chatbot",
        "nvidia",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelCfg {
    /// Tried in order; the first model answering with text wins.
    pub models: Vec<String>,
    pub base_url: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
    pub categorize: bool,
    pub category_cache_size: usize,
}

impl Default for ModelCfg {
    fn default() -> Self {
        Self {
            models: vec!["gemini-1.5-pro".to_string(), "gemini-1.5-flash".to_string()],
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 256,
            timeout_secs: 15,
            categorize: true,
            category_cache_size: 256,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub mode: PipelineMode,
    pub selection: SelectionPolicy,
    pub feeds: Vec<FeedCfg>,
    pub fetch: FetchCfg,
    pub news_api: NewsApiCfg,
    pub relevance: RelevanceCfg,
    pub model: ModelCfg,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::default(),
            selection: SelectionPolicy::default(),
            feeds: default_feeds(),
            fetch: FetchCfg::default(),
            news_api: NewsApiCfg::default(),
            relevance: RelevanceCfg::default(),
            model: ModelCfg::default(),
        }
    }
}

fn default_feeds() -> Vec<FeedCfg> {
    [
        (
            "TechCrunch",
            "https://techcrunch.com/category/artificial-intelligence/feed/",
        ),
        ("VentureBeat", "https://venturebeat.com/category/ai/feed/"),
        (
            "MIT Technology Review",
            "https://www.technologyreview.com/topic/artificial-intelligence/feed",
        ),
        (
            "The Verge",
            "https://www.theverge.com/rss/ai-artificial-intelligence/index.xml",
        ),
        ("Wired", "https://www.wired.com/feed/tag/ai/latest/rss"),
    ]
    .iter()
    .map(|(name, url)| FeedCfg {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}

impl TickerConfig {
    /// Parse from a TOML string and sanitize.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: TickerConfig = toml::from_str(s).context("parsing ticker config toml")?;
        Ok(cfg.sanitized())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading ticker config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Resolve the config path:
    /// 1) $TICKER_CONFIG_PATH (must exist)
    /// 2) config/ticker.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_TICKER_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!(
                "{ENV_TICKER_CONFIG_PATH} points to non-existent path {}",
                pb.display()
            ));
        }
        let default_path = PathBuf::from(DEFAULT_TICKER_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from(&default_path);
        }
        Ok(Self::default())
    }

    fn sanitized(mut self) -> Self {
        let f = &mut self.fetch;
        f.timeout_secs = f.timeout_secs.max(1);
        f.per_feed_cap = f.per_feed_cap.max(1);
        f.global_cap = f.global_cap.max(1);
        f.synthetic_step_minutes = f
            .synthetic_step_minutes
            .clamp(1, MAX_SYNTHETIC_STEP_MINUTES);

        self.news_api.page_size = self.news_api.page_size.clamp(1, 100);

        let r = &mut self.relevance;
        r.keywords = clean_keywords(std::mem::take(&mut r.keywords));
        r.description_weight = r.description_weight.min(MAX_KEYWORD_WEIGHT - 1);
        r.title_weight = r
            .title_weight
            .clamp(r.description_weight + 1, MAX_KEYWORD_WEIGHT);

        self.feeds.retain(|f| !f.url.trim().is_empty());
        self.model.models.retain(|m| !m.trim().is_empty());
        if self.model.models.is_empty() {
            self.model.models = ModelCfg::default().models;
        }
        self.model.timeout_secs = self.model.timeout_secs.max(1);
        self
    }
}

fn clean_keywords(items: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let k = it.trim().to_lowercase();
        if !k.is_empty() && seen.insert(k.clone()) {
            out.push(k);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = TickerConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.mode, PipelineMode::Aggregate);
        assert_eq!(cfg.selection, SelectionPolicy::Recency);
        assert_eq!(cfg.feeds.len(), 5);
        assert_eq!(cfg.fetch.per_feed_cap, 5);
        assert_eq!(cfg.relevance.title_weight, 3);
    }

    #[test]
    fn sanitizes_caps_weights_and_keywords() {
        let toml = r#"
            selection = "relevance"

            [fetch]
            per_feed_cap = 0
            global_cap = 0

            [news_api]
            page_size = 500

            [relevance]
            keywords = [" OpenAI ", "openai", "", "LLM"]
            title_weight = 1
            description_weight = 2
        "#;
        let cfg = TickerConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.selection, SelectionPolicy::Relevance);
        assert_eq!(cfg.fetch.per_feed_cap, 1);
        assert_eq!(cfg.fetch.global_cap, 1);
        assert_eq!(cfg.news_api.page_size, 100);
        assert_eq!(cfg.relevance.keywords, vec!["openai", "llm"]);
        assert_eq!(cfg.relevance.title_weight, 3);
    }

    #[test]
    fn extreme_numbers_are_clamped() {
        let toml = r#"
            [fetch]
            synthetic_step_minutes = 9223372036854775807

            [relevance]
            title_weight = 4294967295
            description_weight = 4294967295
        "#;
        let cfg = TickerConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.fetch.synthetic_step_minutes, MAX_SYNTHETIC_STEP_MINUTES);
        assert_eq!(cfg.relevance.description_weight, MAX_KEYWORD_WEIGHT - 1);
        assert_eq!(cfg.relevance.title_weight, MAX_KEYWORD_WEIGHT);

        let cfg = TickerConfig::from_toml_str("[fetch]\nsynthetic_step_minutes = -5").unwrap();
        assert_eq!(cfg.fetch.synthetic_step_minutes, 1);
    }

    #[test]
    fn feeds_keep_declared_order() {
        let toml = r#"
            [[feeds]]
            name = "B"
            url = "https://b.test/feed"

            [[feeds]]
            name = "A"
            url = "https://a.test/feed"
        "#;
        let cfg = TickerConfig::from_toml_str(toml).unwrap();
        let names: Vec<_> = cfg.feeds.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(TickerConfig::from_toml_str(r#"mode = "shout""#).is_err());
    }
}
