//! Submission Ledger: one record per (application, round) pair, written by
//! advancement and by the evaluation recorder. The two writers touch
//! disjoint fields, so neither ever clobbers the other.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::ensure_job_owner;
use crate::errors::AppError;
use crate::models::submission::{EvaluationScores, SubmissionRow, SubmissionStatus};
use crate::pipeline::applications::fetch_application;

/// Reads the submission for one (application, round) pair.
pub async fn get_submission(
    pool: &PgPool,
    application_id: Uuid,
    round_id: Uuid,
    recruiter_id: Uuid,
) -> Result<SubmissionRow, AppError> {
    let application = fetch_application(pool, application_id).await?;
    ensure_job_owner(pool, application.job_id, recruiter_id).await?;

    sqlx::query_as::<_, SubmissionRow>(
        "SELECT * FROM submissions WHERE application_id = $1 AND round_id = $2",
    )
    .bind(application_id)
    .bind(round_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "No submission for application {application_id} in round {round_id}"
        ))
    })
}

/// Records an evaluator's scores and notes on a submission and marks it
/// completed. Deliberately does not advance the application; scoring a
/// stage and moving the candidate forward are separate decisions.
pub async fn evaluate_submission(
    pool: &PgPool,
    application_id: Uuid,
    round_id: Uuid,
    recruiter_id: Uuid,
    scores: EvaluationScores,
    notes: Option<String>,
) -> Result<SubmissionRow, AppError> {
    let application = fetch_application(pool, application_id).await?;
    ensure_job_owner(pool, application.job_id, recruiter_id).await?;

    let scores_json = serde_json::to_value(&scores)
        .map_err(|e| AppError::Validation(format!("Invalid evaluation scores: {e}")))?;

    let submission = sqlx::query_as::<_, SubmissionRow>(
        r#"
        UPDATE submissions
        SET evaluation_scores = $1,
            recruiter_notes = $2,
            status = $3,
            evaluated_at = now(),
            updated_at = now()
        WHERE application_id = $4 AND round_id = $5
        RETURNING *
        "#,
    )
    .bind(&scores_json)
    .bind(&notes)
    .bind(SubmissionStatus::Completed.as_str())
    .bind(application_id)
    .bind(round_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "No submission for application {application_id} in round {round_id}"
        ))
    })?;

    info!(
        "Evaluated submission {} ({} criteria scored)",
        submission.id,
        scores.len()
    );
    Ok(submission)
}
