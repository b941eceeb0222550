use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Job listing row joined with its company name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: Option<String>,
    pub title: String,
    pub description: String,
    pub min_score: i32,
    pub created_at: DateTime<Utc>,
}

/// The columns needed to evaluate a candidate against a job.
#[derive(Debug, Clone, FromRow)]
pub struct JobMatchRow {
    pub title: String,
    pub min_score: Option<i32>,
    pub required_skills_embedding: Option<Value>,
    pub company_name: Option<String>,
}

/// Fields for a new job row.
#[derive(Debug, Clone)]
pub struct NewJob<'a> {
    pub company_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub min_score: i32,
    pub embedding: &'a [f64],
}
