// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod fallback;
pub mod headline;
pub mod ingest;
pub mod last_good;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod relevance;
pub mod select;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::headline::Headline;
pub use crate::pipeline::Pipeline;

use std::sync::Arc;

/// Build the full application router from config + secrets.
/// Fails when configuration is unusable; the process must not serve then.
pub fn app(cfg: &config::TickerConfig, secrets: &config::Secrets) -> anyhow::Result<axum::Router> {
    let last_good = Arc::new(last_good::LastGoodQueue::new());
    let pipeline = Pipeline::from_config(cfg, secrets, last_good)?;
    Ok(router(AppState::new(pipeline)))
}
