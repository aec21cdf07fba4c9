// tests/ingest_http.rs
//
// Adapters against a local axum server on an ephemeral port: retry budget,
// permanent status codes, the global cap across feeds, and the NewsAPI
// request shape.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ai_news_ticker::config::{FeedCfg, FetchCfg, NewsApiCfg};
use ai_news_ticker::ingest::http::{build_client, get_text, RetryPolicy};
use ai_news_ticker::ingest::providers::{NewsApiAdapter, RssAdapter};
use ai_news_ticker::ingest::types::SourceAdapter;
use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

fn fetch_cfg(timeout_secs: u64, max_retries: u32) -> FetchCfg {
    FetchCfg {
        timeout_secs,
        max_retries,
        retry_delay_ms: 10,
        ..FetchCfg::default()
    }
}

fn rss_doc(prefix: &str, n: usize) -> String {
    let items: String = (1..=n)
        .map(|i| {
            format!(
                "<item><title>{prefix} story {i}</title>\
                 <link>https://{prefix}.test/{i}</link>\
                 <pubDate>Mon, 10 Mar 2025 0{i}:00:00 +0000</pubDate></item>"
            )
        })
        .collect();
    format!(r#"<?xml version="1.0"?><rss version="2.0"><channel><title>{prefix}</title>{items}</channel></rss>"#)
}

/// Route answering `body` and counting every request it sees.
fn counted(hits: &Arc<AtomicUsize>, body: String) -> axum::routing::MethodRouter {
    let hits = hits.clone();
    get(move || {
        let hits = hits.clone();
        let body = body.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            body
        }
    })
}

#[tokio::test]
async fn permanent_status_is_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let app = Router::new().route(
        "/feed",
        get(move || {
            let h = h.clone();
            async move {
                h.fetch_add(1, Ordering::SeqCst);
                (StatusCode::INTERNAL_SERVER_ERROR, "boom")
            }
        }),
    );
    let base = serve(app).await;

    let cfg = fetch_cfg(5, 3);
    let client = build_client(&cfg).unwrap();
    let res = get_text(&client, &format!("{base}/feed"), RetryPolicy::from(&cfg)).await;

    let err = res.expect_err("500 must fail");
    assert!(format!("{err:#}").contains("500"), "{err:#}");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn timeouts_use_the_whole_retry_budget() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let app = Router::new().route(
        "/slow",
        get(move || {
            let h = h.clone();
            async move {
                h.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(5)).await;
                "too late"
            }
        }),
    );
    let base = serve(app).await;

    let cfg = fetch_cfg(1, 2);
    let client = build_client(&cfg).unwrap();
    let res = get_text(&client, &format!("{base}/slow"), RetryPolicy::from(&cfg)).await;

    assert!(res.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 1 + 2);
}

#[tokio::test]
async fn global_cap_spans_feeds_in_priority_order() {
    let a = Arc::new(AtomicUsize::new(0));
    let b = Arc::new(AtomicUsize::new(0));
    let c = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/a.xml", counted(&a, rss_doc("a", 3)))
        .route("/b.xml", counted(&b, rss_doc("b", 3)))
        .route("/c.xml", counted(&c, rss_doc("c", 3)));
    let base = serve(app).await;

    let feeds = ["a", "b", "c"]
        .iter()
        .map(|n| FeedCfg {
            name: n.to_uppercase(),
            url: format!("{base}/{n}.xml"),
        })
        .collect();
    let cfg = FetchCfg {
        per_feed_cap: 2,
        global_cap: 3,
        ..fetch_cfg(5, 0)
    };
    let rss = RssAdapter::new(feeds, &cfg).unwrap();
    let out = rss.fetch_latest().await.unwrap();

    let titles: Vec<_> = out.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["a story 1", "a story 2", "b story 1"]);
    assert_eq!(out[2].source_name, "B");
    assert_eq!(b.load(Ordering::SeqCst), 1);
    assert_eq!(c.load(Ordering::SeqCst), 0, "cap reached before the third feed");
}

type Seen = Arc<Mutex<Option<(HashMap<String, String>, Option<String>)>>>;

#[tokio::test]
async fn newsapi_sends_query_params_and_key_header() {
    let seen: Seen = Arc::new(Mutex::new(None));
    let s = seen.clone();
    let app = Router::new().route(
        "/v2/everything",
        get(move |Query(q): Query<HashMap<String, String>>, headers: HeaderMap| {
            let s = s.clone();
            async move {
                let key = headers
                    .get("x-api-key")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                *s.lock().unwrap() = Some((q, key));
                Json(serde_json::json!({
                    "status": "ok",
                    "totalResults": 1,
                    "articles": [{
                        "source": {"id": null, "name": "Reuters"},
                        "title": "Anthropic raises new round",
                        "description": "Funding news",
                        "url": "https://r.test/1",
                        "publishedAt": "2025-03-10T08:00:00Z"
                    }]
                }))
            }
        }),
    );
    let base = serve(app).await;

    let cfg = NewsApiCfg {
        base_url: format!("{base}/v2"),
        query: "openai OR anthropic".into(),
        language: "en".into(),
        page_size: 7,
    };
    let adapter = NewsApiAdapter::new(cfg, Some("test-key".into()), &fetch_cfg(5, 0)).unwrap();
    let out = adapter.fetch_latest().await.unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].source_name, "Reuters");

    let (q, key) = seen.lock().unwrap().clone().expect("request recorded");
    assert_eq!(q.get("q").map(String::as_str), Some("openai OR anthropic"));
    assert_eq!(q.get("language").map(String::as_str), Some("en"));
    assert_eq!(q.get("sortBy").map(String::as_str), Some("publishedAt"));
    assert_eq!(q.get("pageSize").map(String::as_str), Some("7"));
    assert_eq!(key.as_deref(), Some("test-key"));
}

#[tokio::test]
async fn newsapi_server_error_is_a_single_request() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let app = Router::new().route(
        "/everything",
        get(move || {
            let h = h.clone();
            async move {
                h.fetch_add(1, Ordering::SeqCst);
                (StatusCode::SERVICE_UNAVAILABLE, "down")
            }
        }),
    );
    let base = serve(app).await;

    let cfg = NewsApiCfg {
        base_url: base,
        ..NewsApiCfg::default()
    };
    let adapter = NewsApiAdapter::new(cfg, Some("test-key".into()), &fetch_cfg(5, 3)).unwrap();

    assert!(adapter.fetch_latest().await.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
