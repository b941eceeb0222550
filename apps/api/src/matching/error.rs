use thiserror::Error;

/// Failures raised while decoding or comparing embedding vectors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// The stored representation could not be decoded into a vector of finite numbers.
    #[error("Malformed embedding: {0}")]
    Format(String),

    /// The representation decoded to something other than a one-dimensional vector.
    #[error("Embedding must be one-dimensional, got shape {0:?}")]
    Shape(Vec<usize>),

    /// The codec was handed nothing to decode.
    #[error("Embedding data is missing: {0}")]
    MissingData(String),

    /// A profile or job has never produced an embedding.
    #[error("{0}")]
    NotReady(String),

    #[error("Embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}
