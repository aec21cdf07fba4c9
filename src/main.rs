//! AI News Ticker — Binary Entrypoint
//! Loads config + secrets, boots the Axum HTTP server and the /metrics exporter.

use ai_news_ticker::config::{Secrets, TickerConfig};
use ai_news_ticker::metrics::Metrics;
use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact text logs by default, JSON with `LOG_FORMAT=json`.
/// Leaves an already-installed subscriber (e.g. the runtime's) in place.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ai_news_ticker=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = TickerConfig::load_default().context("loading ticker config")?;
    // Missing GOOGLE_API_KEY aborts startup.
    let secrets = Secrets::from_env().context("loading api credentials")?;
    tracing::info!(?secrets, "credentials loaded");

    let mut router = ai_news_ticker::app(&cfg, &secrets)?;

    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "metrics exporter disabled"),
    }

    Ok(router.into())
}
