pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers as interview;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/model", get(interview::handle_model_info))
        // Jobs and applications
        .route(
            "/api/v1/jobs",
            post(jobs::handle_create_job).get(jobs::handle_list_jobs),
        )
        .route("/api/v1/jobs/:job_id/apply", post(jobs::handle_apply))
        .route(
            "/api/v1/applications/:id",
            get(jobs::handle_get_application),
        )
        .route(
            "/api/v1/applications/:id/interview",
            post(jobs::handle_start_interview_from_application),
        )
        // Interview sessions
        .route(
            "/api/v1/interviews",
            post(interview::handle_start_interview).get(interview::handle_list_sessions),
        )
        .route(
            "/api/v1/interviews/:session_id",
            get(interview::handle_get_session),
        )
        .route(
            "/api/v1/interviews/:session_id/answer",
            post(interview::handle_answer_question),
        )
        .route(
            "/api/v1/interviews/:session_id/score",
            post(interview::handle_score_interview),
        )
        .route(
            "/api/v1/interviews/:session_id/end",
            post(interview::handle_end_interview),
        )
        .with_state(state)
}
