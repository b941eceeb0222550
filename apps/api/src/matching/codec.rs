//! Embedding codec: turns every stored representation of a vector into one
//! canonical `EmbeddingVector`.
//!
//! Stored embeddings arrive in three shapes: a native JSON array, a JSON-encoded
//! string (legacy text / pgvector columns read through `to_jsonb`), or an in-memory
//! array-like value produced by an embedding provider. Each shape has its own
//! decoder; everything downstream of `normalize` only sees `EmbeddingVector`.
//!
//! No resizing, truncation or NaN substitution happens here. Anything that is not
//! a non-empty one-dimensional sequence of finite numbers is rejected.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::matching::error::MatchError;

// ────────────────────────────────────────────────────────────────────────────
// Canonical vector
// ────────────────────────────────────────────────────────────────────────────

/// Ordered sequence of finite `f64` values. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f64>);

impl EmbeddingVector {
    /// Validates and wraps an owned sequence of doubles.
    pub fn new(values: Vec<f64>) -> Result<Self, MatchError> {
        if values.is_empty() {
            return Err(MatchError::Format("embedding is empty".to_string()));
        }
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(MatchError::Format(format!(
                "element {idx} is not a finite number"
            )));
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stored representations
// ────────────────────────────────────────────────────────────────────────────

/// An in-memory array that can report its shape and flatten itself.
pub trait ArrayLike: Send + Sync + fmt::Debug {
    fn shape(&self) -> Vec<usize>;
    fn to_sequence(&self) -> Vec<f64>;
}

impl ArrayLike for Vec<f32> {
    fn shape(&self) -> Vec<usize> {
        vec![self.len()]
    }

    fn to_sequence(&self) -> Vec<f64> {
        self.iter().map(|v| f64::from(*v)).collect()
    }
}

impl ArrayLike for Vec<f64> {
    fn shape(&self) -> Vec<usize> {
        vec![self.len()]
    }

    fn to_sequence(&self) -> Vec<f64> {
        self.clone()
    }
}

impl ArrayLike for Vec<Vec<f32>> {
    fn shape(&self) -> Vec<usize> {
        vec![self.len(), self.first().map(Vec::len).unwrap_or(0)]
    }

    fn to_sequence(&self) -> Vec<f64> {
        self.iter().flatten().map(|v| f64::from(*v)).collect()
    }
}

/// Every representation an embedding can be persisted or produced in.
#[derive(Debug, Clone)]
pub enum StoredEmbedding {
    /// A JSON array straight from a `jsonb` column.
    Sequence(Vec<Value>),
    /// A JSON-encoded array held as text.
    Json(String),
    /// A typed in-memory array.
    Array(Arc<dyn ArrayLike>),
    /// Any other JSON value (object, number, bool). Always rejected.
    Unsupported(Value),
}

impl StoredEmbedding {
    /// Maps a raw column value onto a representation.
    ///
    /// `null`, `[]` and a blank string all mean "never produced" and map to `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        if is_absent(&value) {
            return None;
        }
        match value {
            Value::Array(items) => Some(Self::Sequence(items)),
            Value::String(text) => Some(Self::Json(text)),
            other => Some(Self::Unsupported(other)),
        }
    }

    /// True for a representation that holds no data at all.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Sequence(items) => items.is_empty(),
            Self::Json(text) => text.trim().is_empty(),
            Self::Array(array) => array.shape().iter().product::<usize>() == 0,
            Self::Unsupported(_) => false,
        }
    }

    pub fn from_array<A: ArrayLike + 'static>(array: A) -> Self {
        Self::Array(Arc::new(array))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sequence(_) => "sequence",
            Self::Json(_) => "json",
            Self::Array(_) => "array",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

/// Whether a raw column value counts as "no embedding yet".
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Decodes any stored representation into the canonical vector.
pub fn normalize(raw: Option<&StoredEmbedding>) -> Result<EmbeddingVector, MatchError> {
    let raw = raw.ok_or_else(|| MatchError::MissingData("no embedding provided".to_string()))?;

    match raw {
        StoredEmbedding::Sequence(items) => decode_sequence(items),
        StoredEmbedding::Json(text) => decode_json(text),
        StoredEmbedding::Array(array) => decode_array(array.as_ref()),
        StoredEmbedding::Unsupported(value) => Err(MatchError::Format(format!(
            "unsupported embedding representation: {}",
            json_type_name(value)
        ))),
    }
}

fn decode_sequence(items: &[Value]) -> Result<EmbeddingVector, MatchError> {
    if items.iter().any(Value::is_array) {
        return Err(MatchError::Shape(json_shape(items)));
    }

    let values = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_f64().ok_or_else(|| {
                MatchError::Format(format!(
                    "element {idx} is not numeric ({})",
                    json_type_name(item)
                ))
            })
        })
        .collect::<Result<Vec<f64>, MatchError>>()?;

    EmbeddingVector::new(values)
}

fn decode_json(text: &str) -> Result<EmbeddingVector, MatchError> {
    let decoded: Value = serde_json::from_str(text)
        .map_err(|e| MatchError::Format(format!("failed to decode JSON embedding: {e}")))?;

    match decoded {
        Value::Array(items) => decode_sequence(&items),
        Value::Null => Err(MatchError::MissingData(
            "JSON-encoded embedding is null".to_string(),
        )),
        other => Err(MatchError::Format(format!(
            "decoded JSON is not a list ({})",
            json_type_name(&other)
        ))),
    }
}

fn decode_array(array: &dyn ArrayLike) -> Result<EmbeddingVector, MatchError> {
    let shape = array.shape();
    if shape.len() != 1 {
        return Err(MatchError::Shape(shape));
    }
    EmbeddingVector::new(array.to_sequence())
}

fn json_shape(items: &[Value]) -> Vec<usize> {
    let inner = items
        .iter()
        .find_map(|v| v.as_array().map(Vec::len))
        .unwrap_or(0);
    vec![items.len(), inner]
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
