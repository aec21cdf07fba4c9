//! Generative text backend: provider abstraction + Gemini client + mock.

pub mod categorize;
pub mod generate;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::config::{ModelCfg, Secrets};

pub const ENV_AI_TEST_MODE: &str = "AI_TEST_MODE";

/// Sampling parameters sent with every prompt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl From<&ModelCfg> for GenerationParams {
    fn from(cfg: &ModelCfg) -> Self {
        Self {
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            top_k: cfg.top_k,
            max_output_tokens: cfg.max_output_tokens,
        }
    }
}

/// Prompt in, plain text out.
pub trait TextModel: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        params: GenerationParams,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynTextModel = Arc<dyn TextModel>;

/// Factory: `AI_TEST_MODE=mock` yields a deterministic mock, otherwise Gemini.
pub fn build_model(cfg: &ModelCfg, secrets: &Secrets) -> anyhow::Result<DynTextModel> {
    if std::env::var(ENV_AI_TEST_MODE)
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        tracing::info!("text model: mock (AI_TEST_MODE=mock)");
        return Ok(Arc::new(MockModel::headlines()));
    }
    let gemini = GeminiModel::new(cfg, secrets.google_api_key.clone())?;
    tracing::info!(models = ?cfg.models, "text model: gemini");
    Ok(Arc::new(gemini))
}

// ------------------------------------------------------------
// Gemini (generateContent REST API)
// ------------------------------------------------------------

pub struct GeminiModel {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    /// Tried in order until one answers with text.
    models: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateReq<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationParams,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResp {
    #[serde(default)]
    candidates: Vec<RespCandidate>,
}

#[derive(Deserialize)]
struct RespCandidate {
    content: Option<RespContent>,
}

#[derive(Deserialize)]
struct RespContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}

#[derive(Deserialize)]
struct RespPart {
    text: Option<String>,
}

impl GeminiModel {
    pub fn new(cfg: &ModelCfg, api_key: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("ai-news-ticker/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("building gemini http client")?;
        Ok(Self {
            http,
            api_key,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            models: cfg.models.clone(),
        })
    }

    async fn call(
        &self,
        model: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> anyhow::Result<String> {
        let req = GenerateReq {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: params,
        };
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .context("gemini post()")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("gemini {model}: HTTP {status}"));
        }
        let body: GenerateResp = resp.json().await.context("decoding gemini json")?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(anyhow!("gemini {model}: no text in response"));
        }
        Ok(text)
    }
}

impl TextModel for GeminiModel {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        params: GenerationParams,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let mut last_err = anyhow!("no gemini models configured");
            for model in &self.models {
                match self.call(model, prompt, params).await {
                    Ok(text) => return Ok(text),
                    Err(e) => {
                        tracing::warn!(error = ?e, %model, "gemini model failed, trying next");
                        last_err = e;
                    }
                }
            }
            Err(last_err)
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// ------------------------------------------------------------
// Mock
// ------------------------------------------------------------

/// Returns a fixed text for every prompt; `None` simulates an outage.
#[derive(Clone)]
pub struct MockModel {
    pub fixed: Option<String>,
}

impl MockModel {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            fixed: Some(text.into()),
        }
    }

    pub fn failing() -> Self {
        Self { fixed: None }
    }

    /// Canned answer used by `AI_TEST_MODE=mock`.
    pub fn headlines() -> Self {
        Self::new(
            "Research lab releases open-weight reasoning model\n\
             Chipmaker reports record demand for AI accelerators\n\
             Regulators publish draft rules for foundation models\n\
             Startup raises funding for on-device language models\n\
             Study finds AI coding assistants speed up code review",
        )
    }
}

impl TextModel for MockModel {
    fn generate<'a>(
        &'a self,
        _prompt: &'a str,
        _params: GenerationParams,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        let out = self
            .fixed
            .clone()
            .ok_or_else(|| anyhow!("mock model unavailable"));
        Box::pin(async move { out })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
