use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::round::{RoundRow, RoundWithCount};
use crate::rounds::directory::{
    create_round, delete_round, list_rounds, reorder_rounds, update_round, CreateRound,
    UpdateRound,
};
use crate::rounds::ordering::ReorderEntry;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RecruiterIdQuery {
    pub recruiter_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateRoundRequest {
    pub recruiter_id: Uuid,
    #[serde(flatten)]
    pub round: CreateRound,
}

#[derive(Deserialize)]
pub struct UpdateRoundRequest {
    pub recruiter_id: Uuid,
    #[serde(flatten)]
    pub round: UpdateRound,
}

#[derive(Deserialize)]
pub struct ReorderRequest {
    pub recruiter_id: Uuid,
    pub rounds: Vec<ReorderEntry>,
}

/// POST /api/v1/jobs/:job_id/rounds
pub async fn handle_create_round(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<CreateRoundRequest>,
) -> Result<(StatusCode, Json<RoundRow>), AppError> {
    let round = create_round(&state.db, job_id, req.recruiter_id, req.round).await?;
    Ok((StatusCode::CREATED, Json(round)))
}

/// GET /api/v1/jobs/:job_id/rounds
pub async fn handle_get_rounds(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<RecruiterIdQuery>,
) -> Result<Json<Vec<RoundWithCount>>, AppError> {
    let rounds = list_rounds(&state.db, job_id, params.recruiter_id).await?;
    Ok(Json(rounds))
}

/// PATCH /api/v1/jobs/:job_id/rounds/:round_id
pub async fn handle_update_round(
    State(state): State<AppState>,
    Path((job_id, round_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateRoundRequest>,
) -> Result<Json<RoundRow>, AppError> {
    let round = update_round(&state.db, job_id, round_id, req.recruiter_id, req.round).await?;
    Ok(Json(round))
}

/// DELETE /api/v1/jobs/:job_id/rounds/:round_id
pub async fn handle_delete_round(
    State(state): State<AppState>,
    Path((job_id, round_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<RecruiterIdQuery>,
) -> Result<StatusCode, AppError> {
    delete_round(&state.db, job_id, round_id, params.recruiter_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/jobs/:job_id/rounds/reorder
pub async fn handle_reorder_rounds(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Vec<RoundRow>>, AppError> {
    let rounds = reorder_rounds(&state.db, job_id, req.recruiter_id, req.rounds).await?;
    Ok(Json(rounds))
}
