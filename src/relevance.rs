// src/relevance.rs
//! Keyword relevance scoring.
//!
//! Each configured keyword contributes `title_weight` when it occurs in the
//! title and `description_weight` when it occurs in the description; distinct
//! keywords accumulate. Matching is case-insensitive substring matching, so
//! "ai" fires on "OpenAI" and "GenAI". `whole_word_max_len` opts short
//! keywords into whole-word matching instead.

use regex::Regex;

use crate::config::RelevanceCfg;
use crate::ingest::types::Candidate;

#[derive(Debug)]
enum Matcher {
    Substring(String),
    Word(Regex),
}

impl Matcher {
    fn is_match(&self, haystack_lower: &str) -> bool {
        match self {
            Matcher::Substring(k) => haystack_lower.contains(k.as_str()),
            Matcher::Word(re) => re.is_match(haystack_lower),
        }
    }
}

#[derive(Debug)]
struct Keyword {
    text: String,
    matcher: Matcher,
}

/// Result of scoring one title/description pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relevance {
    pub score: u32,
    pub matched: Vec<String>,
}

#[derive(Debug)]
pub struct KeywordScorer {
    keywords: Vec<Keyword>,
    title_weight: u32,
    description_weight: u32,
}

impl KeywordScorer {
    pub fn from_cfg(cfg: &RelevanceCfg) -> anyhow::Result<Self> {
        let keywords = cfg
            .keywords
            .iter()
            .map(|k| {
                let text = k.trim().to_lowercase();
                let matcher = if text.chars().count() <= cfg.whole_word_max_len {
                    let re = Regex::new(&format!(r"\b{}\b", regex::escape(&text)))
                        .map_err(|e| anyhow::anyhow!("keyword `{text}` regex error: {e}"))?;
                    Matcher::Word(re)
                } else {
                    Matcher::Substring(text.clone())
                };
                Ok(Keyword { text, matcher })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            keywords,
            title_weight: cfg.title_weight,
            description_weight: cfg.description_weight,
        })
    }

    pub fn evaluate(&self, title: &str, description: &str) -> Relevance {
        let title = title.to_lowercase();
        let description = description.to_lowercase();

        let mut rel = Relevance::default();
        for k in &self.keywords {
            let mut hit = false;
            if k.matcher.is_match(&title) {
                rel.score = rel.score.saturating_add(self.title_weight);
                hit = true;
            }
            if k.matcher.is_match(&description) {
                rel.score = rel.score.saturating_add(self.description_weight);
                hit = true;
            }
            if hit {
                rel.matched.push(k.text.clone());
            }
        }
        rel
    }

    /// `0` means "not topically relevant".
    pub fn score(&self, title: &str, description: &str) -> u32 {
        self.evaluate(title, description).score
    }

    pub fn score_candidate(&self, c: &Candidate) -> u32 {
        self.score(&c.title, &c.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer_with(keywords: &[&str], whole_word_max_len: usize) -> KeywordScorer {
        KeywordScorer::from_cfg(&RelevanceCfg {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            title_weight: 3,
            description_weight: 1,
            whole_word_max_len,
        })
        .unwrap()
    }

    fn scorer(keywords: &[&str]) -> KeywordScorer {
        scorer_with(keywords, 0)
    }

    #[test]
    fn title_outweighs_description() {
        let s = scorer(&["openai"]);
        assert_eq!(s.score("OpenAI ships a model", ""), 3);
        assert_eq!(s.score("A model ships", "by OpenAI"), 1);
        assert_eq!(s.score("OpenAI ships", "OpenAI says"), 4);
    }

    #[test]
    fn distinct_keywords_accumulate() {
        let s = scorer(&["openai", "machine learning", "gpt"]);
        let r = s.evaluate("OpenAI releases GPT-5", "A machine learning milestone");
        assert_eq!(r.score, 3 + 3 + 1);
        assert_eq!(r.matched, vec!["openai", "machine learning", "gpt"]);
    }

    #[test]
    fn short_keywords_match_inside_words_by_default() {
        let s = scorer(&["ai"]);
        assert_eq!(s.score("OpenAI ships agents", ""), 3);
        assert_eq!(s.score("GenAI startups boom", ""), 3);
        assert_eq!(s.score("Microsoft rolls out Copilot AIs to Office", ""), 3);
    }

    #[test]
    fn default_keywords_score_compound_ai_names() {
        let s = KeywordScorer::from_cfg(&RelevanceCfg::default()).unwrap();
        assert!(s.score("GenAI startups boom", "") > 0);
        assert!(s.score("OpenAI unveils Sora", "") > 0);
    }

    #[test]
    fn whole_word_option_limits_short_keywords() {
        let s = scorer_with(&["ai", "openai"], 3);
        assert_eq!(s.score("He said again", "maintain the rain"), 0);
        assert_eq!(s.score("New AI rules", ""), 3);
        assert_eq!(s.score("AI-powered search", ""), 3);
        // "openai" is longer than the limit and stays a substring match
        assert_eq!(s.score("GenAI and OpenAI", ""), 3);
    }

    #[test]
    fn scores_saturate_instead_of_overflowing() {
        let s = KeywordScorer::from_cfg(&RelevanceCfg {
            keywords: vec!["openai".into(), "model".into()],
            title_weight: u32::MAX,
            description_weight: u32::MAX - 1,
            whole_word_max_len: 0,
        })
        .unwrap();
        assert_eq!(s.score("OpenAI model", "OpenAI model"), u32::MAX);
    }

    #[test]
    fn irrelevant_text_scores_zero() {
        let s = scorer(&["openai", "neural"]);
        assert_eq!(s.score("Local bakery wins award", "Best croissant in town"), 0);
    }
}
