// src/config/mod.rs
pub mod secrets;
pub mod ticker;

pub use secrets::Secrets;
pub use ticker::{
    FeedCfg, FetchCfg, ModelCfg, NewsApiCfg, PipelineMode, RelevanceCfg, SelectionPolicy,
    TickerConfig,
};
