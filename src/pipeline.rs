// src/pipeline.rs
//! Refresh entry point: fetch → select → enrich → pad → format.
//!
//! `refresh` never fails. A failed build is answered from the last good
//! queue, or from the fallback catalog when nothing was built yet.

use std::sync::Arc;

use anyhow::{anyhow, ensure, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tokio::sync::Mutex;

use crate::config::{PipelineMode, Secrets, SelectionPolicy, TickerConfig};
use crate::fallback::catalog_candidates;
use crate::headline::{format_queue, Headline};
use crate::ingest::collect_candidates;
use crate::ingest::providers::{NewsApiAdapter, RssAdapter};
use crate::ingest::types::{Candidate, SourceAdapter};
use crate::last_good::LastGoodQueue;
use crate::model::categorize::Categorizer;
use crate::model::generate::HeadlineGenerator;
use crate::model::{build_model, GenerationParams};
use crate::relevance::KeywordScorer;
use crate::select::{fill_from_catalog, select_live, QUEUE_LEN};

/// Source label for model-written headlines.
pub const GENERATED_SOURCE: &str = "AI Generated";

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ticker_fallback_padding_total",
            "Catalog entries used to pad a short live queue."
        );
        describe_counter!(
            "ticker_degraded_total",
            "Refreshes answered from last good queue or catalog after an error."
        );
    });
}

pub struct Pipeline {
    mode: PipelineMode,
    policy: SelectionPolicy,
    adapters: Vec<Box<dyn SourceAdapter>>,
    scorer: KeywordScorer,
    categorizer: Option<Categorizer>,
    generator: Option<HeadlineGenerator>,
    last_good: Arc<LastGoodQueue>,
    // serializes refreshes
    gate: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        adapters: Vec<Box<dyn SourceAdapter>>,
        scorer: KeywordScorer,
        last_good: Arc<LastGoodQueue>,
    ) -> Self {
        Self {
            mode: PipelineMode::Aggregate,
            policy: SelectionPolicy::Recency,
            adapters,
            scorer,
            categorizer: None,
            generator: None,
            last_good,
            gate: Mutex::new(()),
        }
    }

    pub fn with_mode(mut self, mode: PipelineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_categorizer(mut self, categorizer: Categorizer) -> Self {
        self.categorizer = Some(categorizer);
        self
    }

    pub fn with_generator(mut self, generator: HeadlineGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Wire adapters, scorer and model from configuration.
    pub fn from_config(
        cfg: &TickerConfig,
        secrets: &Secrets,
        last_good: Arc<LastGoodQueue>,
    ) -> Result<Self> {
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(RssAdapter::new(cfg.feeds.clone(), &cfg.fetch)?),
            Box::new(NewsApiAdapter::new(
                cfg.news_api.clone(),
                secrets.news_api_key.clone(),
                &cfg.fetch,
            )?),
        ];
        let scorer = KeywordScorer::from_cfg(&cfg.relevance)?;
        let model = build_model(&cfg.model, secrets)?;
        let params = GenerationParams::from(&cfg.model);

        let mut p = Self::new(adapters, scorer, last_good)
            .with_mode(cfg.mode)
            .with_policy(cfg.selection)
            .with_generator(HeadlineGenerator::new(model.clone(), params));
        if cfg.model.categorize {
            p = p.with_categorizer(Categorizer::new(
                model,
                params,
                cfg.model.category_cache_size,
            ));
        }
        tracing::info!(
            mode = ?cfg.mode,
            policy = ?cfg.selection,
            feeds = cfg.feeds.len(),
            news_api = secrets.news_api_key.is_some(),
            categorize = cfg.model.categorize,
            "pipeline configured"
        );
        Ok(p)
    }

    pub fn last_good(&self) -> &Arc<LastGoodQueue> {
        &self.last_good
    }

    pub async fn refresh(&self) -> Vec<Headline> {
        self.refresh_at(Utc::now()).await
    }

    /// Always returns exactly five headlines.
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> Vec<Headline> {
        ensure_metrics_described();
        let _serial = self.gate.lock().await;

        match self.build(now).await {
            Ok(queue) => {
                self.last_good.store(&queue);
                queue
            }
            Err(e) => {
                tracing::error!(error = ?e, "refresh failed, serving degraded queue");
                self.recover(now)
            }
        }
    }

    async fn build(&self, now: DateTime<Utc>) -> Result<Vec<Headline>> {
        let queue = match self.mode {
            PipelineMode::Aggregate => self.aggregate(now).await,
            PipelineMode::Generate => self.generate(now).await?,
        };
        validate_queue(&queue)?;
        Ok(queue)
    }

    async fn aggregate(&self, now: DateTime<Utc>) -> Vec<Headline> {
        let merged = collect_candidates(&self.adapters).await;
        let merged_len = merged.len();
        let mut live = select_live(merged, self.policy, &self.scorer);

        if let Some(cat) = &self.categorizer {
            for c in live.iter_mut() {
                c.category = Some(cat.categorize(&c.title, &c.description).await);
            }
        }

        self.pad_and_format(live, now, merged_len)
    }

    async fn generate(&self, now: DateTime<Utc>) -> Result<Vec<Headline>> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| anyhow!("generate mode without a headline generator"))?;
        let titles = generator.generate().await?;
        tracing::info!(
            provider = generator.provider_name(),
            count = titles.len(),
            "headlines generated"
        );
        let live: Vec<Candidate> = titles
            .into_iter()
            .map(|t| Candidate::new(t, GENERATED_SOURCE, now))
            .collect();
        let merged_len = live.len();
        Ok(self.pad_and_format(live, now, merged_len))
    }

    fn pad_and_format(
        &self,
        live: Vec<Candidate>,
        now: DateTime<Utc>,
        merged_len: usize,
    ) -> Vec<Headline> {
        let live_len = live.len();
        let (queue, padded) = fill_from_catalog(live, catalog_candidates(now));
        if live_len == 0 {
            tracing::info!(merged = merged_len, "no usable live headlines, serving fallback catalog");
        } else if padded > 0 {
            tracing::info!(live = live_len, padded, "live headlines padded from catalog");
        }
        counter!("ticker_fallback_padding_total").increment(padded as u64);
        format_queue(&queue)
    }

    fn recover(&self, now: DateTime<Utc>) -> Vec<Headline> {
        if let Some(queue) = self.last_good.snapshot() {
            counter!("ticker_degraded_total", "reason" => "last_good").increment(1);
            return queue;
        }
        counter!("ticker_degraded_total", "reason" => "catalog").increment(1);
        let (queue, _) = fill_from_catalog(Vec::new(), catalog_candidates(now));
        format_queue(&queue)
    }
}

/// Exactly five entries, ids "1".."5", only the first marked latest.
pub fn validate_queue(queue: &[Headline]) -> Result<()> {
    ensure!(
        queue.len() == QUEUE_LEN,
        "queue has {} entries, expected {QUEUE_LEN}",
        queue.len()
    );
    for (i, h) in queue.iter().enumerate() {
        ensure!(h.id == (i + 1).to_string(), "unexpected id {} at {}", h.id, i);
        ensure!(h.is_latest == (i == 0), "isLatest misplaced at {}", h.id);
        ensure!(!h.title.trim().is_empty(), "empty title at {}", h.id);
    }
    Ok(())
}
