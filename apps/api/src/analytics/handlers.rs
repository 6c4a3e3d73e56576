use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::analytics::funnel::{get_job_analytics, JobAnalytics};
use crate::errors::AppError;
use crate::rounds::handlers::RecruiterIdQuery;
use crate::state::AppState;

/// GET /api/v1/jobs/:job_id/analytics
pub async fn handle_get_analytics(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<RecruiterIdQuery>,
) -> Result<Json<JobAnalytics>, AppError> {
    let analytics = get_job_analytics(&state.db, job_id, params.recruiter_id).await?;
    Ok(Json(analytics))
}
