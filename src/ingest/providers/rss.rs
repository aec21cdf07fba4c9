// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;

use crate::config::ticker::MAX_SYNTHETIC_STEP_MINUTES;
use crate::config::{FeedCfg, FetchCfg};
use crate::ingest::dates::{parse_free_text, parse_structured, resolve_published, EntryDates};
use crate::ingest::http::{build_client, get_text, RetryPolicy};
use crate::ingest::normalize_text;
use crate::ingest::types::{Candidate, SourceAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timestamps {
    /// RFC 2822 / RFC 3339 only.
    Structured,
    /// Any format [`parse_free_text`] understands.
    Lenient,
}

fn parse_document(xml: &str, timestamps: Timestamps) -> Result<Feed> {
    let builder = parser::Builder::new();
    let builder = match timestamps {
        Timestamps::Structured => builder.timestamp_parser(parse_structured),
        Timestamps::Lenient => builder.timestamp_parser(parse_free_text),
    };
    builder
        .build()
        .parse(xml.as_bytes())
        .context("parsing feed document")
}

/// The entry's own page: the first link without a `rel` or with
/// `rel="alternate"`, else the first link at all.
fn entry_link(e: &Entry) -> String {
    e.links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
        .or_else(|| e.links.first())
        .map(|l| l.href.trim().to_string())
        .unwrap_or_default()
}

fn entry_description(e: &Entry) -> String {
    e.summary
        .as_ref()
        .map(|t| t.content.clone())
        .or_else(|| e.content.as_ref().and_then(|c| c.body.clone()))
        .unwrap_or_default()
}

/// Parse one RSS 2.0, RSS 1.0 (RDF) or Atom document into at most `cap`
/// candidates. Entries with an empty title are dropped and do not count
/// toward `cap`.
pub fn parse_feed(
    xml: &str,
    feed_name: &str,
    cap: usize,
    now: DateTime<Utc>,
    step: Duration,
) -> Result<Vec<Candidate>> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    let feed = parse_document(&xml_clean, Timestamps::Structured)?;

    // Second pass only when some entry has no structured date; entries
    // line up by index since it is the same document.
    let free_text: Vec<Option<DateTime<Utc>>> = if feed
        .entries
        .iter()
        .any(|e| e.published.is_none() && e.updated.is_none())
    {
        parse_document(&xml_clean, Timestamps::Lenient)?
            .entries
            .iter()
            .map(|e| e.published.or(e.updated))
            .collect()
    } else {
        Vec::new()
    };

    let mut out = Vec::with_capacity(cap.min(feed.entries.len()));
    for (index, e) in feed.entries.iter().enumerate() {
        if out.len() >= cap {
            break;
        }
        let title = normalize_text(e.title.as_ref().map(|t| t.content.as_str()).unwrap_or_default());
        if title.is_empty() {
            continue;
        }
        let dates = EntryDates {
            published: e.published,
            updated: e.updated,
            free_text: free_text.get(index).copied().flatten(),
        };
        let (published_at, origin) = resolve_published(dates, now, index, step);
        tracing::trace!(feed = feed_name, ?origin, %title, "feed entry dated");

        out.push(
            Candidate::new(title, feed_name, published_at)
                .with_description(normalize_text(&entry_description(e)))
                .with_url(entry_link(e)),
        );
    }
    Ok(out)
}

/// Walks a priority-ordered list of feeds. A failing feed is logged and
/// skipped; scanning stops once `global_cap` candidates are collected.
pub struct RssAdapter {
    feeds: Vec<FeedCfg>,
    client: reqwest::Client,
    retry: RetryPolicy,
    per_feed_cap: usize,
    global_cap: usize,
    step: Duration,
}

impl RssAdapter {
    pub fn new(feeds: Vec<FeedCfg>, cfg: &FetchCfg) -> Result<Self> {
        Ok(Self {
            feeds,
            client: build_client(cfg)?,
            retry: RetryPolicy::from(cfg),
            per_feed_cap: cfg.per_feed_cap,
            global_cap: cfg.global_cap,
            step: Duration::minutes(
                cfg.synthetic_step_minutes
                    .clamp(1, MAX_SYNTHETIC_STEP_MINUTES),
            ),
        })
    }

    async fn fetch_feed(&self, feed: &FeedCfg, remaining: usize) -> Result<Vec<Candidate>> {
        let body = get_text(&self.client, &feed.url, self.retry).await?;
        let cap = self.per_feed_cap.min(remaining);
        parse_feed(&body, &feed.name, cap, Utc::now(), self.step)
            .with_context(|| format!("feed {}", feed.name))
    }
}

#[async_trait]
impl SourceAdapter for RssAdapter {
    async fn fetch_latest(&self) -> Result<Vec<Candidate>> {
        let mut out = Vec::new();
        for feed in &self.feeds {
            let remaining = self.global_cap.saturating_sub(out.len());
            if remaining == 0 {
                break;
            }
            match self.fetch_feed(feed, remaining).await {
                Ok(mut v) => {
                    tracing::info!(feed = %feed.name, count = v.len(), "feed parsed");
                    out.append(&mut v);
                }
                Err(e) => {
                    tracing::warn!(error = ?e, feed = %feed.name, "feed skipped");
                    metrics::counter!("ticker_source_errors_total", "source" => "rss")
                        .increment(1);
                }
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "rss"
    }
}

/// XML only knows five named entities; feeds often carry HTML ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
