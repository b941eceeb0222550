pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::aptitude::handlers as aptitude;
use crate::jobs::handlers as jobs;
use crate::matching::handlers as matching;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Matching
        .route("/match", post(matching::handle_match))
        .route("/match/status/:user_id", get(matching::handle_match_status))
        // Aptitude
        .route(
            "/aptitude/generate/:company_id",
            get(aptitude::handle_generate_paper),
        )
        // Jobs
        .route("/jobs/create", post(jobs::handle_create_job))
        .route("/jobs/list", get(jobs::handle_list_jobs))
        .route("/jobs/:job_id", delete(jobs::handle_delete_job))
        // Resume
        .route(
            "/resume/upload",
            post(resume::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/resume/status/:user_id", get(resume::handle_resume_status))
        .with_state(state)
}
