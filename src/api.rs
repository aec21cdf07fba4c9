use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use tower_http::cors::CorsLayer;

use crate::headline::Headline;
use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/news", get(get_news))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn get_news(State(state): State<AppState>) -> Json<Vec<Headline>> {
    Json(state.pipeline.refresh().await)
}
