//! Persistence access. Handlers and the sampler only talk to the store through
//! this module; no other module issues SQL.

pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::aptitude::paper::QuestionRecord;
use crate::aptitude::quota::TopicQuota;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Read access to the question bank and per-company quotas.
///
/// Carried by the sampler as a generic bound so tests can substitute an
/// in-memory bank.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Up to `limit` questions, restricted to `topic` when given.
    async fn question_pool(
        &self,
        topic: Option<&str>,
        limit: usize,
    ) -> Result<Vec<QuestionRecord>, StoreError>;

    /// The company's quota; `Ok(None)` when it has no config,
    /// `StoreError::NotFound` when the company does not exist.
    async fn topic_quota(&self, company_id: Uuid) -> Result<Option<TopicQuota>, StoreError>;
}
