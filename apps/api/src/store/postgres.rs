use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::aptitude::paper::QuestionRecord;
use crate::aptitude::quota::TopicQuota;
use crate::models::company::CompanyRow;
use crate::models::job::{JobMatchRow, JobRow, NewJob};
use crate::models::profile::ProfileRow;
use crate::models::question::QuestionRow;
use crate::store::{QuestionBank, StoreError};

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the profile, or `None` if no row exists.
    pub async fn profile(&self, user_id: Uuid) -> Result<Option<ProfileRow>, StoreError> {
        Ok(sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, full_name, to_jsonb(skills_embedding) AS skills_embedding, resume_url
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Job title, threshold, company name and embedding for matching.
    pub async fn job_for_match(&self, job_id: Uuid) -> Result<Option<JobMatchRow>, StoreError> {
        Ok(sqlx::query_as::<_, JobMatchRow>(
            r#"
            SELECT j.title, j.min_score,
                   to_jsonb(j.required_skills_embedding) AS required_skills_embedding,
                   c.name AS company_name
            FROM jobs j
            LEFT JOIN companies c ON c.id = j.company_id
            WHERE j.id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn company(&self, company_id: Uuid) -> Result<Option<CompanyRow>, StoreError> {
        Ok(sqlx::query_as::<_, CompanyRow>(
            "SELECT id, name, aptitude_config FROM companies WHERE id = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Stores a freshly generated resume embedding. Returns `false` if no profile matched.
    pub async fn update_profile_embedding(
        &self,
        user_id: Uuid,
        embedding: &[f64],
    ) -> Result<bool, StoreError> {
        let embedding = serde_json::to_value(embedding)
            .map_err(|e| StoreError::Corrupt(format!("failed to encode embedding: {e}")))?;

        let result = sqlx::query(
            "UPDATE profiles SET skills_embedding = $1, resume_url = 'uploaded' WHERE id = $2",
        )
        .bind(&embedding)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        info!(
            "Updated skills embedding for profile {user_id} ({} rows)",
            result.rows_affected()
        );
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_job(&self, job: NewJob<'_>) -> Result<JobRow, StoreError> {
        let embedding = serde_json::to_value(job.embedding)
            .map_err(|e| StoreError::Corrupt(format!("failed to encode embedding: {e}")))?;

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            WITH inserted AS (
                INSERT INTO jobs (company_id, title, description, min_score, required_skills_embedding)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, company_id, title, description, min_score, created_at
            )
            SELECT i.id, i.company_id, c.name AS company_name, i.title, i.description,
                   i.min_score, i.created_at
            FROM inserted i
            LEFT JOIN companies c ON c.id = i.company_id
            "#,
        )
        .bind(job.company_id)
        .bind(job.title)
        .bind(job.description)
        .bind(job.min_score)
        .bind(&embedding)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted job {} for company {}", row.id, row.company_id);
        Ok(row)
    }

    /// All jobs, newest first, optionally restricted to one company.
    pub async fn list_jobs(&self, company_id: Option<Uuid>) -> Result<Vec<JobRow>, StoreError> {
        Ok(sqlx::query_as::<_, JobRow>(
            r#"
            SELECT j.id, j.company_id, c.name AS company_name, j.title, j.description,
                   j.min_score, j.created_at
            FROM jobs j
            LEFT JOIN companies c ON c.id = j.company_id
            WHERE ($1::uuid IS NULL OR j.company_id = $1)
            ORDER BY j.created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Returns `false` if no job had this id.
    pub async fn delete_job(&self, job_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl QuestionBank for PgStore {
    async fn question_pool(
        &self,
        topic: Option<&str>,
        limit: usize,
    ) -> Result<Vec<QuestionRecord>, StoreError> {
        let limit = i64::try_from(limit)
            .map_err(|_| StoreError::Corrupt(format!("pool limit {limit} out of range")))?;

        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id::text AS id, question, options, topic, correct_answer
            FROM questions
            WHERE ($1::text IS NULL OR topic = $1)
            LIMIT $2
            "#,
        )
        .bind(topic)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(topic = ?topic, limit, fetched = rows.len(), "Fetched question pool");
        Ok(rows.into_iter().map(QuestionRecord::from).collect())
    }

    async fn topic_quota(&self, company_id: Uuid) -> Result<Option<TopicQuota>, StoreError> {
        let company = self
            .company(company_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Company with id {company_id} not found")))?;

        company
            .aptitude_config
            .as_ref()
            .map(TopicQuota::from_config)
            .transpose()
            .map_err(|e| StoreError::Corrupt(format!("company {company_id}: {e}")))
    }
}
