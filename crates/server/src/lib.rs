pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use finlens_import::Vocabulary;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig};
pub use error::AppError;

pub struct AppState {
    pub vocabulary: Arc<Vocabulary>,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let vocabulary = match &config.vocabulary_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("read {}", path.display()))?;
                let vocabulary = Vocabulary::with_overrides_toml(&content)
                    .with_context(|| format!("parse {}", path.display()))?;
                tracing::info!("Loaded vocabulary overrides from {}", path.display());
                vocabulary
            }
            None => Vocabulary::default(),
        };
        Ok(Self {
            vocabulary: Arc::new(vocabulary),
        })
    }
}

pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/analyze", post(routes::analyze_file))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {origin}");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
