use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::codec::StoredEmbedding;
use crate::matching::evaluator::{evaluate, MatchSide};
use crate::matching::similarity::MatchBand;
use crate::state::AppState;

const PROFILE_NOT_READY: &str =
    "User has not uploaded a resume yet. Skills embedding is required for matching.";
const JOB_NOT_READY: &str = "Job does not have a skills embedding. Please recreate the job.";

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub user_id: Uuid,
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub status: &'static str,
    pub match_score: f64,
    pub similarity: f64,
    pub analysis: String,
    pub band: MatchBand,
    pub details: MatchDetails,
}

#[derive(Debug, Serialize)]
pub struct MatchDetails {
    pub user_name: String,
    pub job_title: String,
    pub company_name: String,
    pub min_score_required: i32,
    pub meets_threshold: bool,
    pub recommendation: String,
}

#[derive(Debug, Serialize)]
pub struct MatchStatusResponse {
    pub user_id: Uuid,
    pub user_name: String,
    pub ready_for_matching: bool,
    pub has_resume: bool,
    pub message: &'static str,
}

fn recommendation(meets_threshold: bool, min_score: i32) -> String {
    if meets_threshold {
        "Apply now!".to_string()
    } else {
        format!("Consider improving your profile to meet the {min_score}% threshold.")
    }
}

/// POST /match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let profile = state.store.profile(req.user_id).await?.ok_or_else(|| {
        AppError::NotFound(format!("User profile with id '{}' not found", req.user_id))
    })?;
    let job = state
        .store
        .job_for_match(req.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job with id '{}' not found", req.job_id)))?;

    let user_name = profile.display_name().to_string();
    let user_embedding = profile.skills_embedding.and_then(StoredEmbedding::from_value);
    let job_embedding = job
        .required_skills_embedding
        .and_then(StoredEmbedding::from_value);
    let min_score = job.min_score.unwrap_or(0);

    debug!(
        user_repr = user_embedding.as_ref().map(StoredEmbedding::kind),
        job_repr = job_embedding.as_ref().map(StoredEmbedding::kind),
        "Loaded stored embeddings"
    );

    let result = evaluate(
        MatchSide {
            embedding: user_embedding.as_ref(),
            not_ready_message: PROFILE_NOT_READY,
        },
        MatchSide {
            embedding: job_embedding.as_ref(),
            not_ready_message: JOB_NOT_READY,
        },
        f64::from(min_score),
        &job.title,
    )?;

    info!(
        user_id = %req.user_id,
        job_id = %req.job_id,
        score = result.score_percent,
        meets_threshold = result.meets_threshold,
        "Match calculated"
    );

    Ok(Json(MatchResponse {
        status: "success",
        match_score: result.score_percent,
        similarity: result.similarity,
        analysis: result.analysis,
        band: result.band,
        details: MatchDetails {
            user_name,
            job_title: job.title,
            company_name: job.company_name.unwrap_or_else(|| "Unknown".to_string()),
            min_score_required: min_score,
            meets_threshold: result.meets_threshold,
            recommendation: recommendation(result.meets_threshold, min_score),
        },
    }))
}

/// GET /match/status/:user_id
pub async fn handle_match_status(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<MatchStatusResponse>, AppError> {
    let profile = state
        .store
        .profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User profile with id '{user_id}' not found")))?;

    let ready = profile.has_embedding();
    Ok(Json(MatchStatusResponse {
        user_id,
        user_name: profile.display_name().to_string(),
        ready_for_matching: ready,
        has_resume: profile.resume_url.is_some(),
        message: if ready {
            "Ready for job matching!"
        } else {
            "Please upload your resume first to enable job matching."
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_when_threshold_met() {
        assert_eq!(recommendation(true, 70), "Apply now!");
    }

    #[test]
    fn test_recommendation_names_threshold() {
        assert_eq!(
            recommendation(false, 70),
            "Consider improving your profile to meet the 70% threshold."
        );
    }

    #[test]
    fn test_match_response_shape() {
        let response = MatchResponse {
            status: "success",
            match_score: 72.5,
            similarity: 0.725,
            analysis: "Good match!".into(),
            band: MatchBand::Good,
            details: MatchDetails {
                user_name: "User".into(),
                job_title: "Backend Engineer".into(),
                company_name: "Unknown".into(),
                min_score_required: 50,
                meets_threshold: true,
                recommendation: recommendation(true, 50),
            },
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["band"], "good");
        assert_eq!(value["details"]["min_score_required"], 50);
        assert_eq!(value["details"]["recommendation"], "Apply now!");
    }
}
