use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::submission::{EvaluationScores, SubmissionRow};
use crate::rounds::handlers::RecruiterIdQuery;
use crate::state::AppState;
use crate::submissions::ledger::{evaluate_submission, get_submission};

#[derive(Deserialize)]
pub struct EvaluateRequest {
    pub recruiter_id: Uuid,
    pub scores: EvaluationScores,
    pub notes: Option<String>,
}

/// GET /api/v1/applications/:id/rounds/:round_id/submission
pub async fn handle_get_submission(
    State(state): State<AppState>,
    Path((application_id, round_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<RecruiterIdQuery>,
) -> Result<Json<SubmissionRow>, AppError> {
    let submission =
        get_submission(&state.db, application_id, round_id, params.recruiter_id).await?;
    Ok(Json(submission))
}

/// PUT /api/v1/applications/:id/rounds/:round_id/submission
pub async fn handle_evaluate_submission(
    State(state): State<AppState>,
    Path((application_id, round_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<SubmissionRow>, AppError> {
    let submission = evaluate_submission(
        &state.db,
        application_id,
        round_id,
        req.recruiter_id,
        req.scores,
        req.notes,
    )
    .await?;
    Ok(Json(submission))
}
