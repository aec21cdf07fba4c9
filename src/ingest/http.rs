// src/ingest/http.rs
//! Shared HTTP plumbing for adapters: one client per adapter, bounded
//! timeout, and retries on transient errors only.

use anyhow::{anyhow, Context, Result};
use reqwest::{RequestBuilder, Response};
use std::time::Duration;

use crate::config::FetchCfg;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Linear backoff: `delay * attempt`.
    fn backoff(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt)
    }
}

impl From<&FetchCfg> for RetryPolicy {
    fn from(cfg: &FetchCfg) -> Self {
        Self {
            max_retries: cfg.max_retries,
            delay: Duration::from_millis(cfg.retry_delay_ms),
        }
    }
}

pub fn build_client(cfg: &FetchCfg) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(cfg.user_agent.clone())
        .connect_timeout(Duration::from_secs(cfg.timeout_secs))
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("building http client")
}

/// Connection and timeout failures are worth another attempt; HTTP status
/// errors and body decoding failures are not.
pub fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect()
}

/// Send `request`, retrying transient failures up to `retry.max_retries`
/// times. A non-success status fails at once.
pub async fn send_with_retry(request: RequestBuilder, retry: RetryPolicy) -> Result<Response> {
    let mut attempt = 0u32;
    loop {
        let req = request
            .try_clone()
            .ok_or_else(|| anyhow!("request body cannot be replayed"))?;
        match req.send().await {
            Ok(resp) => {
                let status = resp.status();
                if !status.is_success() {
                    return Err(anyhow!("HTTP {status} from {}", resp.url()));
                }
                return Ok(resp);
            }
            Err(e) if is_transient(&e) && attempt < retry.max_retries => {
                attempt += 1;
                tracing::warn!(error = %e, attempt, "transient http error, retrying");
                tokio::time::sleep(retry.backoff(attempt)).await;
            }
            Err(e) => return Err(e).context("http request failed"),
        }
    }
}

/// GET `url` and return the body as text.
pub async fn get_text(client: &reqwest::Client, url: &str, retry: RetryPolicy) -> Result<String> {
    let request = client.get(url).header(
        reqwest::header::ACCEPT,
        "application/rss+xml, application/atom+xml, application/xml;q=0.9, */*;q=0.8",
    );
    let resp = send_with_retry(request, retry)
        .await
        .with_context(|| format!("GET {url}"))?;
    resp.text().await.context("reading response body")
}
