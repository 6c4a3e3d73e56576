pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::analytics::handlers as analytics_handlers;
use crate::pipeline::handlers as pipeline_handlers;
use crate::rounds::handlers as round_handlers;
use crate::state::AppState;
use crate::submissions::handlers as submission_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Round Directory
        .route(
            "/api/v1/jobs/:job_id/rounds",
            get(round_handlers::handle_get_rounds).post(round_handlers::handle_create_round),
        )
        .route(
            "/api/v1/jobs/:job_id/rounds/reorder",
            put(round_handlers::handle_reorder_rounds),
        )
        .route(
            "/api/v1/jobs/:job_id/rounds/:round_id",
            patch(round_handlers::handle_update_round).delete(round_handlers::handle_delete_round),
        )
        // Applications
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(pipeline_handlers::handle_get_applications),
        )
        .route(
            "/api/v1/applications/:id",
            get(pipeline_handlers::handle_get_application),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(pipeline_handlers::handle_update_status),
        )
        .route(
            "/api/v1/applications/:id/advance",
            post(pipeline_handlers::handle_advance),
        )
        // Submissions
        .route(
            "/api/v1/applications/:id/rounds/:round_id/submission",
            get(submission_handlers::handle_get_submission)
                .put(submission_handlers::handle_evaluate_submission),
        )
        // Funnel analytics
        .route(
            "/api/v1/jobs/:job_id/analytics",
            get(analytics_handlers::handle_get_analytics),
        )
        .with_state(state)
}
