use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus, ApplicationWithSubmissions};
use crate::pipeline::applications::{
    advance, get_application, list_applications, update_status, ApplicationFilter,
    ApplicationPage,
};
use crate::rounds::handlers::RecruiterIdQuery;
use crate::state::AppState;

// Flat on purpose: serde_urlencoded cannot deserialize numeric fields
// through #[serde(flatten)].
#[derive(Deserialize)]
pub struct ApplicationListQuery {
    pub recruiter_id: Uuid,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub recruiter_id: Uuid,
    pub status: ApplicationStatus,
}

#[derive(Deserialize)]
pub struct AdvanceRequest {
    pub recruiter_id: Uuid,
}

/// GET /api/v1/jobs/:job_id/applications
pub async fn handle_get_applications(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<ApplicationListQuery>,
) -> Result<Json<ApplicationPage>, AppError> {
    let filter = ApplicationFilter {
        page: params.page,
        limit: params.limit,
        status: params.status,
        search: params.search,
    };
    let page = list_applications(&state.db, job_id, params.recruiter_id, filter).await?;
    Ok(Json(page))
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Query(params): Query<RecruiterIdQuery>,
) -> Result<Json<ApplicationWithSubmissions>, AppError> {
    let application = get_application(&state.db, application_id, params.recruiter_id).await?;
    Ok(Json(application))
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let updated = update_status(&state.db, application_id, req.recruiter_id, req.status).await?;
    Ok(Json(updated))
}

/// POST /api/v1/applications/:id/advance
pub async fn handle_advance(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<AdvanceRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let updated = advance(&state.db, application_id, req.recruiter_id).await?;
    Ok(Json(updated))
}
