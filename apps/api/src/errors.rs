use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::aptitude::sampler::SamplerError;
use crate::embedding::EmbeddingError;
use crate::matching::error::MatchError;
use crate::resume::extract::ExtractError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A profile or job has not produced an embedding yet.
    #[error("Not ready: {0}")]
    NotReady(String),

    /// A stored embedding could not be decoded or compared.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The store or the embedding provider failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotReady(msg) => (StatusCode::BAD_REQUEST, "NOT_READY", msg.clone()),
            AppError::Embedding(msg) => {
                tracing::error!("Embedding error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EMBEDDING_ERROR",
                    msg.clone(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    format!("An internal server error occurred: {e}"),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::NotReady(msg) => AppError::NotReady(msg),
            MatchError::MissingData(_) => AppError::NotReady(err.to_string()),
            MatchError::Format(_) | MatchError::Shape(_) | MatchError::DimensionMismatch { .. } => {
                AppError::Embedding(format!("Failed to calculate similarity: {err}"))
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Database(_) | StoreError::Corrupt(_) => AppError::Upstream(err.to_string()),
        }
    }
}

impl From<SamplerError> for AppError {
    fn from(err: SamplerError) -> Self {
        match err {
            SamplerError::NoQuestions => AppError::NotFound(err.to_string()),
            SamplerError::TopicFetch { .. } => AppError::Upstream(err.to_string()),
            SamplerError::Upstream(store) => store.into(),
        }
    }
}

impl From<EmbeddingError> for AppError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::EmptyInput => AppError::Validation(err.to_string()),
            _ => AppError::Upstream(format!("Failed to generate embedding: {err}")),
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        AppError::Validation(format!("Failed to extract text: {err}"))
    }
}
