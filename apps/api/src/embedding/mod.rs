//! Embedding generation: the only path by which new vectors enter the system.
//!
//! `AppState` holds one long-lived `Arc<dyn EmbeddingProvider>` built at startup:
//! `HttpEmbeddingProvider` when `EMBEDDING_API_URL` is set, otherwise an
//! `EmbeddingPool` over the local `HashingEmbedder`. Every implementation bounds
//! its in-flight invocations with a semaphore, and local CPU-bound embedding
//! never runs on the request-handling tasks.

pub mod hashing;
pub mod http;
pub mod pool;

use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

use crate::matching::codec::{normalize, EmbeddingVector, StoredEmbedding};
use crate::matching::error::MatchError;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbeddingProvider;
pub use pool::{BlockingEmbedder, EmbeddingPool};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected embedding response: {0}")]
    Parse(String),

    #[error("Expected a {expected}-dimensional embedding, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("Provider returned an invalid vector: {0}")]
    Invalid(#[from] MatchError),

    #[error("Cannot embed empty text")]
    EmptyInput,

    #[error("Embedding worker failed: {0}")]
    WorkerPool(String),
}

/// Produces a fixed-dimension vector from raw text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;

    /// The dimension every returned vector has.
    fn dimension(&self) -> usize;

    /// Human-readable backend label for logs.
    fn name(&self) -> &str;
}

/// Request/response dialect of a remote embedding endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiProviderKind {
    /// `{"inputs": text}` → `[f, ...]` or `[[f, ...]]`
    HuggingFace,
    /// `{"input": text, "model": m}` → `{"data": [{"embedding": [f, ...]}]}`
    OpenAi,
}

impl FromStr for ApiProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hf" | "huggingface" => Ok(ApiProviderKind::HuggingFace),
            "openai" => Ok(ApiProviderKind::OpenAi),
            other => Err(format!("unknown embedding provider '{other}'")),
        }
    }
}

/// Runs provider output through the codec and enforces the configured dimension.
pub fn validate_output(
    raw: StoredEmbedding,
    expected: usize,
) -> Result<EmbeddingVector, EmbeddingError> {
    let vector = normalize(Some(&raw))?;
    if vector.dimension() != expected {
        return Err(EmbeddingError::Dimension {
            expected,
            actual: vector.dimension(),
        });
    }
    Ok(vector)
}

pub(crate) fn ensure_text(text: &str) -> Result<(), EmbeddingError> {
    if text.trim().is_empty() {
        return Err(EmbeddingError::EmptyInput);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("HF".parse::<ApiProviderKind>(), Ok(ApiProviderKind::HuggingFace));
        assert_eq!("openai".parse::<ApiProviderKind>(), Ok(ApiProviderKind::OpenAi));
        assert!("cohere".parse::<ApiProviderKind>().is_err());
    }

    #[test]
    fn test_validate_output_rejects_wrong_dimension() {
        let raw = StoredEmbedding::from_array(vec![0.1f32; 768]);
        let err = validate_output(raw, 384).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::Dimension {
                expected: 384,
                actual: 768
            }
        ));
    }

    #[test]
    fn test_validate_output_accepts_matching_dimension() {
        let raw = StoredEmbedding::from_array(vec![0.5f32; 384]);
        assert_eq!(validate_output(raw, 384).unwrap().dimension(), 384);
    }

    #[test]
    fn test_validate_output_rejects_nan() {
        let mut values = vec![0.5f32; 4];
        values[2] = f32::NAN;
        let err = validate_output(StoredEmbedding::from_array(values), 4).unwrap_err();
        assert!(matches!(err, EmbeddingError::Invalid(MatchError::Format(_))));
    }
}
