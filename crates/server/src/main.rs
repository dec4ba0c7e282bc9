use std::sync::Arc;

use anyhow::Context;
use finlens_server::{router, AppState, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::load().context("load server config")?;
    let state = AppState::from_config(&config)?;
    let app = router(Arc::new(state), &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("bind {}", config.bind_addr()))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
