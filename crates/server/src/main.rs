use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use tally_extract::HttpExtractor;
use tally_server::{build_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    let db = tally_storage::create_db(&config.database_path)
        .await
        .context("failed to open database")?;

    if config.extractor.api_key.is_none() {
        tracing::warn!("EXTRACTION_API_KEY is not set; CSV imports will fail until it is configured");
    }
    let extractor = HttpExtractor::new(config.extractor.clone())
        .context("failed to build extraction client")?;

    let state = AppState { db, extractor: Arc::new(extractor) };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
