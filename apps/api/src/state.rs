use std::sync::Arc;

use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::store::PgStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: PgStore,
    /// Long-lived embedding backend, built once at startup.
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub config: Config,
}
