use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::aptitude::paper::PaperQuestion;
use crate::aptitude::sampler::QuestionSampler;
use crate::errors::AppError;
use crate::state::AppState;
use crate::store::QuestionBank;

/// GET /aptitude/generate/:company_id
///
/// Returns the shuffled, answer-free question list for the company's quota.
pub async fn handle_generate_paper(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<Vec<PaperQuestion>>, AppError> {
    let quota = state.store.topic_quota(company_id).await?;

    let sampler = QuestionSampler::new(&state.store, state.config.sampling_policy());
    let paper = sampler.generate(quota.as_ref()).await?;

    if !paper.skipped_topics.is_empty() {
        warn!(
            %company_id,
            skipped = ?paper.skipped_topics,
            "Aptitude paper generated with missing topics"
        );
    }
    info!(
        %company_id,
        questions = paper.questions.len(),
        "Generated aptitude paper"
    );

    Ok(Json(paper.questions))
}
