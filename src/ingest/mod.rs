// src/ingest/mod.rs
pub mod dates;
pub mod http;
pub mod providers;
pub mod types;

use crate::ingest::types::{Candidate, SourceAdapter};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ticker_candidates_total",
            "Candidates returned by source adapters."
        );
        describe_counter!(
            "ticker_source_errors_total",
            "Source adapter fetch/parse errors."
        );
        describe_histogram!("ticker_fetch_ms", "Per-source fetch time in milliseconds.");
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Run every adapter in priority order and merge their output.
/// A failing adapter is logged and contributes nothing.
pub async fn collect_candidates(adapters: &[Box<dyn SourceAdapter>]) -> Vec<Candidate> {
    ensure_metrics_described();

    let mut merged = Vec::new();
    for a in adapters {
        let t0 = std::time::Instant::now();
        match a.fetch_latest().await {
            Ok(mut v) => {
                v.retain(|c| !c.title.trim().is_empty());
                tracing::debug!(source = a.name(), count = v.len(), "source fetched");
                counter!("ticker_candidates_total", "source" => a.name()).increment(v.len() as u64);
                merged.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = a.name(), "source error");
                counter!("ticker_source_errors_total", "source" => a.name()).increment(1);
            }
        }
        metrics::histogram!("ticker_fetch_ms", "source" => a.name())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
    }
    merged
}
