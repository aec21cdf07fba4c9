// src/ingest/providers/mod.rs
pub mod news_api;
pub mod rss;

pub use news_api::NewsApiAdapter;
pub use rss::RssAdapter;
