use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobRow, NewJob};
use crate::state::AppState;

const MIN_DESCRIPTION_CHARS: usize = 20;

fn default_min_score() -> i32 {
    50
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    /// Integer percentage in `0..=100`.
    #[serde(default = "default_min_score")]
    pub min_score: i32,
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct JobSummary {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub title: String,
    pub description: String,
    pub min_score: i32,
    pub created_at: DateTime<Utc>,
}

impl From<JobRow> for JobSummary {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            company_id: row.company_id,
            company_name: row.company_name.unwrap_or_else(|| "Unknown".to_string()),
            title: row.title,
            description: row.description,
            min_score: row.min_score,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedJob {
    #[serde(flatten)]
    pub job: JobSummary,
    pub embedding_dimensions: usize,
}

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub job: CreatedJob,
}

#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub status: &'static str,
    pub count: usize,
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Serialize)]
pub struct DeleteJobResponse {
    pub status: &'static str,
    pub message: String,
}

fn validate(req: &CreateJobRequest) -> Result<(), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Job title must not be empty".to_string()));
    }
    if req.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(AppError::Validation(format!(
            "Job description must be at least {MIN_DESCRIPTION_CHARS} characters long"
        )));
    }
    if !(0..=100).contains(&req.min_score) {
        return Err(AppError::Validation(format!(
            "min_score must be between 0 and 100, got {}",
            req.min_score
        )));
    }
    Ok(())
}

/// POST /jobs/create
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<Json<CreateJobResponse>, AppError> {
    let company = state
        .store
        .company(req.company_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company with id {} not found", req.company_id)))?;

    validate(&req)?;

    let embedding = state.embedder.embed(&req.description).await?;

    let row = state
        .store
        .insert_job(NewJob {
            company_id: req.company_id,
            title: req.title.trim(),
            description: &req.description,
            min_score: req.min_score,
            embedding: embedding.as_slice(),
        })
        .await?;

    info!(
        job_id = %row.id,
        company = %company.name,
        embedder = state.embedder.name(),
        "Job created"
    );

    Ok(Json(CreateJobResponse {
        status: "success",
        message: "Job created successfully",
        job: CreatedJob {
            job: row.into(),
            embedding_dimensions: embedding.dimension(),
        },
    }))
}

/// GET /jobs/list
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListJobsQuery>,
) -> Result<Json<ListJobsResponse>, AppError> {
    let jobs: Vec<JobSummary> = state
        .store
        .list_jobs(params.company_id)
        .await?
        .into_iter()
        .map(JobSummary::from)
        .collect();

    Ok(Json(ListJobsResponse {
        status: "success",
        count: jobs.len(),
        jobs,
    }))
}

/// DELETE /jobs/:job_id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<DeleteJobResponse>, AppError> {
    if !state.store.delete_job(job_id).await? {
        return Err(AppError::NotFound(format!("Job with id {job_id} not found")));
    }

    info!(%job_id, "Job deleted");
    Ok(Json(DeleteJobResponse {
        status: "success",
        message: format!("Job {job_id} deleted successfully"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, description: &str, min_score: i32) -> CreateJobRequest {
        CreateJobRequest {
            company_id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            min_score,
        }
    }

    const DESCRIPTION: &str = "Python developer with FastAPI and PostgreSQL experience";

    #[test]
    fn test_min_score_defaults_to_fifty() {
        let req: CreateJobRequest = serde_json::from_value(serde_json::json!({
            "company_id": Uuid::new_v4(),
            "title": "Backend Engineer",
            "description": DESCRIPTION
        }))
        .unwrap();
        assert_eq!(req.min_score, 50);
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate(&request("Backend Engineer", DESCRIPTION, 70)).is_ok());
    }

    #[test]
    fn test_short_description_is_rejected() {
        let err = validate(&request("Backend Engineer", "   too short    ", 50)).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("20 characters")));
    }

    #[test]
    fn test_blank_title_is_rejected() {
        assert!(matches!(
            validate(&request("  ", DESCRIPTION, 50)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_min_score_out_of_range_is_rejected() {
        assert!(validate(&request("Engineer", DESCRIPTION, 101)).is_err());
        assert!(validate(&request("Engineer", DESCRIPTION, -1)).is_err());
        assert!(validate(&request("Engineer", DESCRIPTION, 0)).is_ok());
        assert!(validate(&request("Engineer", DESCRIPTION, 100)).is_ok());
    }

    #[test]
    fn test_summary_defaults_company_name() {
        let row = JobRow {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            company_name: None,
            title: "Engineer".into(),
            description: DESCRIPTION.into(),
            min_score: 60,
            created_at: Utc::now(),
        };
        let summary = JobSummary::from(row);
        assert_eq!(summary.company_name, "Unknown");
    }

    #[test]
    fn test_created_job_flattens_summary() {
        let created = CreatedJob {
            job: JobSummary {
                id: Uuid::nil(),
                company_id: Uuid::nil(),
                company_name: "Acme".into(),
                title: "Engineer".into(),
                description: DESCRIPTION.into(),
                min_score: 60,
                created_at: Utc::now(),
            },
            embedding_dimensions: 384,
        };
        let value = serde_json::to_value(&created).unwrap();
        assert_eq!(value["company_name"], "Acme");
        assert_eq!(value["embedding_dimensions"], 384);
    }
}
