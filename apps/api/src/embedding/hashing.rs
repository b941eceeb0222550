//! Deterministic local embedder.
//!
//! Feature-hashes lowercase alphanumeric tokens and adjacent token pairs into a
//! fixed number of buckets with signed contributions, then L2-normalises.
//! Texts that share vocabulary land close together under cosine similarity,
//! which is enough for matching without a model server.

use crate::embedding::{validate_output, BlockingEmbedder, EmbeddingError};
use crate::matching::codec::{EmbeddingVector, StoredEmbedding};

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn accumulate(&self, feature: &str, weight: f32, buckets: &mut [f32]) {
        let hash = blake3::hash(feature.as_bytes());
        let bytes = hash.as_bytes();

        let mut index_bytes = [0u8; 8];
        index_bytes.copy_from_slice(&bytes[..8]);
        let index = (u64::from_le_bytes(index_bytes) % self.dimension as u64) as usize;
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };

        buckets[index] += sign * weight;
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl BlockingEmbedder for HashingEmbedder {
    fn embed_blocking(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let tokens = tokenize(text);
        let mut buckets = vec![0.0f32; self.dimension];

        for token in &tokens {
            self.accumulate(token, 1.0, &mut buckets);
        }
        for pair in tokens.windows(2) {
            self.accumulate(&format!("{} {}", pair[0], pair[1]), 0.5, &mut buckets);
        }

        let norm = buckets.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            buckets.iter_mut().for_each(|v| *v /= norm);
        }

        validate_output(StoredEmbedding::from_array(buckets), self.dimension)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::similarity::score;

    fn embed(text: &str) -> EmbeddingVector {
        HashingEmbedder::new(384).embed_blocking(text).unwrap()
    }

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("Node.js, REST-API & PostgreSQL!"),
            vec!["node", "js", "rest", "api", "postgresql"]
        );
    }

    #[test]
    fn test_output_is_deterministic_and_unit_length() {
        let a = embed("Senior Python developer with FastAPI experience");
        let b = embed("Senior Python developer with FastAPI experience");
        assert_eq!(a, b);
        assert_eq!(a.dimension(), 384);

        let norm: f64 = a.as_slice().iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm was {norm}");
    }

    #[test]
    fn test_shared_vocabulary_scores_higher() {
        let job = embed("Python backend engineer: FastAPI, PostgreSQL, Docker");
        let close = embed("Backend engineer skilled in Python, FastAPI and PostgreSQL");
        let far = embed("Pastry chef specialising in laminated dough and viennoiserie");

        let near_score = score(&job, &close).unwrap();
        let far_score = score(&job, &far).unwrap();
        assert!(near_score > far_score, "{near_score} <= {far_score}");
        assert!(near_score > 0.3, "near score was {near_score}");
    }

    #[test]
    fn test_punctuation_only_text_gives_zero_vector() {
        let v = embed("--- !!! ...");
        assert!(v.as_slice().iter().all(|x| *x == 0.0));
    }
}
