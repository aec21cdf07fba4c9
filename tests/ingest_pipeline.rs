// tests/ingest_pipeline.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ai_news_ticker::ingest::collect_candidates;
use ai_news_ticker::ingest::types::{Candidate, SourceAdapter};
use chrono::Utc;

struct MockAdapter(&'static str, Vec<&'static str>);

#[async_trait]
impl SourceAdapter for MockAdapter {
    async fn fetch_latest(&self) -> Result<Vec<Candidate>> {
        Ok(self
            .1
            .iter()
            .map(|t| Candidate::new(*t, self.0, Utc::now()))
            .collect())
    }
    fn name(&self) -> &'static str {
        self.0
    }
}

struct BrokenAdapter;

#[async_trait]
impl SourceAdapter for BrokenAdapter {
    async fn fetch_latest(&self) -> Result<Vec<Candidate>> {
        Err(anyhow!("malformed response"))
    }
    fn name(&self) -> &'static str {
        "broken"
    }
}

#[tokio::test]
async fn merges_in_priority_order_and_skips_failures() {
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(MockAdapter("first", vec!["a1", "a2"])),
        Box::new(BrokenAdapter),
        Box::new(MockAdapter("second", vec!["b1"])),
    ];
    let out = collect_candidates(&adapters).await;
    let titles: Vec<_> = out.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["a1", "a2", "b1"]);
    assert_eq!(out[2].source_name, "second");
}

#[tokio::test]
async fn blank_titles_never_reach_aggregation() {
    let adapters: Vec<Box<dyn SourceAdapter>> =
        vec![Box::new(MockAdapter("m", vec!["ok", "   ", ""]))];
    let out = collect_candidates(&adapters).await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].title, "ok");
}
