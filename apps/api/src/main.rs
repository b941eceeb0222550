mod aptitude;
mod config;
mod db;
mod embedding;
mod errors;
mod jobs;
mod matching;
mod models;
mod resume;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::{EmbeddingPool, EmbeddingProvider, HashingEmbedder, HttpEmbeddingProvider};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Placement API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = PgStore::new(db);

    let embedder = build_embedder(&config)?;
    info!(
        "Embedding provider initialized: {} ({} dimensions, max {} concurrent)",
        embedder.name(),
        embedder.dimension(),
        config.embedding_max_concurrency
    );

    let state = AppState {
        store,
        embedder,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Remote endpoint when `EMBEDDING_API_URL` is set, otherwise the local hashing embedder.
fn build_embedder(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    match &config.embedding_api_url {
        Some(url) => Ok(Arc::new(HttpEmbeddingProvider::new(
            url.clone(),
            config.embedding_api_key.clone(),
            config.embedding_api_provider,
            config.embedding_model.clone(),
            config.embedding_dimension,
            config.embedding_max_concurrency,
        )?)),
        None => {
            warn!("EMBEDDING_API_URL not set; using the local hashing embedder");
            Ok(Arc::new(EmbeddingPool::new(
                HashingEmbedder::new(config.embedding_dimension),
                config.embedding_max_concurrency,
            )))
        }
    }
}
