// src/config/secrets.rs
use std::env;

pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";

/// API credentials, read once at startup.
#[derive(Clone, Default)]
pub struct Secrets {
    pub google_api_key: String,
    /// `None` degrades the search adapter to always-empty.
    pub news_api_key: Option<String>,
}

impl Secrets {
    /// Reads credentials from the process environment.
    /// A missing `GOOGLE_API_KEY` is fatal.
    pub fn from_env() -> anyhow::Result<Self> {
        let google_api_key = env::var(ENV_GOOGLE_API_KEY)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow::anyhow!("{ENV_GOOGLE_API_KEY} not found in environment"))?;

        let news_api_key = env::var(ENV_NEWS_API_KEY)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            google_api_key,
            news_api_key,
        })
    }
}

// Keys never reach logs.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("google_api_key_len", &self.google_api_key.len())
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "set"))
            .finish()
    }
}
