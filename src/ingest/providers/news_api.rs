// src/ingest/providers/news_api.rs
//! NewsAPI `/everything` search: one topic query per refresh.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::config::{FetchCfg, NewsApiCfg};
use crate::ingest::dates::{parse_free_text, parse_rfc3339};
use crate::ingest::http::{build_client, send_with_retry, RetryPolicy};
use crate::ingest::normalize_text;
use crate::ingest::types::{Candidate, SourceAdapter};

/// Title NewsAPI substitutes for withdrawn articles.
const REMOVED_PLACEHOLDER: &str = "[Removed]";

#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub source: ArticleSource,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleSource {
    pub name: Option<String>,
}

/// Map API articles to candidates, skipping empty and placeholder titles.
/// Articles without a parseable timestamp are stamped with the fetch time.
pub fn map_articles(articles: Vec<NewsArticle>) -> Vec<Candidate> {
    let now = Utc::now();
    articles
        .into_iter()
        .filter_map(|a| {
            let title = normalize_text(a.title.as_deref().unwrap_or_default());
            if title.is_empty() || title.eq_ignore_ascii_case(REMOVED_PLACEHOLDER) {
                return None;
            }
            let published_at = a
                .published_at
                .as_deref()
                .and_then(|p| parse_rfc3339(p).or_else(|| parse_free_text(p)))
                .unwrap_or(now);
            let source = a
                .source
                .name
                .map(|n| normalize_text(&n))
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "NewsAPI".to_string());
            Some(
                Candidate::new(title, source, published_at)
                    .with_description(normalize_text(a.description.as_deref().unwrap_or_default()))
                    .with_url(a.url.unwrap_or_default()),
            )
        })
        .collect()
}

pub struct NewsApiAdapter {
    cfg: NewsApiCfg,
    api_key: Option<String>,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl NewsApiAdapter {
    /// `api_key = None` makes every fetch return an empty list.
    pub fn new(cfg: NewsApiCfg, api_key: Option<String>, fetch: &FetchCfg) -> Result<Self> {
        Ok(Self {
            cfg,
            api_key,
            client: build_client(fetch)?,
            retry: RetryPolicy::from(fetch),
        })
    }

    async fn query(&self, api_key: &str) -> Result<NewsApiResponse> {
        let url = format!("{}/everything", self.cfg.base_url.trim_end_matches('/'));
        let page_size = self.cfg.page_size.to_string();
        let params = [
            ("q", self.cfg.query.as_str()),
            ("language", self.cfg.language.as_str()),
            ("sortBy", "publishedAt"),
            ("pageSize", page_size.as_str()),
        ];

        let request = self
            .client
            .get(&url)
            .header("X-Api-Key", api_key)
            .query(&params);
        let resp = send_with_retry(request, self.retry)
            .await
            .context("newsapi get()")?;

        let body: NewsApiResponse = resp.json().await.context("decoding newsapi json")?;
        if body.status != "ok" {
            return Err(anyhow!(
                "newsapi error: code={} message={}",
                body.code.as_deref().unwrap_or("-"),
                body.message.as_deref().unwrap_or("-")
            ));
        }
        Ok(body)
    }
}

#[async_trait]
impl SourceAdapter for NewsApiAdapter {
    async fn fetch_latest(&self) -> Result<Vec<Candidate>> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("newsapi key not configured, skipping");
            return Ok(Vec::new());
        };
        let body = self.query(api_key).await?;
        let mut out = map_articles(body.articles);
        out.truncate(self.cfg.page_size as usize);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}
