//! Bounded worker pool for CPU-bound embedders.
//!
//! A semaphore caps concurrent invocations; each invocation runs under
//! `tokio::task::spawn_blocking` so model code never executes on the tasks that
//! accept requests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::embedding::{ensure_text, EmbeddingError, EmbeddingProvider};
use crate::matching::codec::EmbeddingVector;

/// A synchronous, possibly slow embedder.
pub trait BlockingEmbedder: Send + Sync + 'static {
    fn embed_blocking(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;
    fn dimension(&self) -> usize;
    fn name(&self) -> &str;
}

pub struct EmbeddingPool<E: BlockingEmbedder> {
    inner: Arc<E>,
    permits: Arc<Semaphore>,
}

impl<E: BlockingEmbedder> EmbeddingPool<E> {
    pub fn new(embedder: E, max_concurrency: usize) -> Self {
        Self {
            inner: Arc::new(embedder),
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }
}

#[async_trait]
impl<E: BlockingEmbedder> EmbeddingProvider for EmbeddingPool<E> {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        ensure_text(text)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| EmbeddingError::WorkerPool(e.to_string()))?;

        let inner = Arc::clone(&self.inner);
        let text = text.to_owned();
        tokio::task::spawn_blocking(move || inner.embed_blocking(&text))
            .await
            .map_err(|e| EmbeddingError::WorkerPool(format!("spawn_blocking failed: {e}")))?
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures_util::future::join_all;

    use crate::embedding::HashingEmbedder;

    /// Sleeps while recording the peak number of concurrent calls.
    #[derive(Default)]
    struct SlowEmbedder {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl BlockingEmbedder for SlowEmbedder {
        fn embed_blocking(&self, _text: &str) -> Result<EmbeddingVector, EmbeddingError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(EmbeddingVector::new(vec![1.0, 0.0])?)
        }

        fn dimension(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_pool_embeds_with_inner_dimension() {
        let pool = EmbeddingPool::new(HashingEmbedder::new(384), 2);
        let v = pool.embed("Rust and PostgreSQL").await.unwrap();
        assert_eq!(v.dimension(), 384);
        assert_eq!(pool.dimension(), 384);
        assert_eq!(pool.name(), "hashing");
    }

    #[tokio::test]
    async fn test_pool_rejects_blank_text() {
        let pool = EmbeddingPool::new(HashingEmbedder::new(384), 1);
        assert!(matches!(
            pool.embed("   \n").await,
            Err(EmbeddingError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_pool_bounds_concurrency() {
        let pool = EmbeddingPool::new(SlowEmbedder::default(), 2);

        let results = join_all((0..8).map(|_| pool.embed("resume text"))).await;

        assert!(results.iter().all(Result::is_ok));
        let peak = pool.inner.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 2, "peak concurrency was {peak}");
    }
}
