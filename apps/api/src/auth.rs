//! Job-ownership authorization boundary.
//!
//! Caller identity is resolved by the enclosing auth layer and passed in as
//! a recruiter id; every pipeline operation checks it against the job's
//! recorded owner before touching any other state.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobRow;

/// Loads a job or fails with `NotFound`.
pub async fn fetch_job(pool: &PgPool, job_id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

/// Loads a job and verifies the caller owns it.
/// Runs before any mutation in every pipeline operation.
pub async fn ensure_job_owner(
    pool: &PgPool,
    job_id: Uuid,
    recruiter_id: Uuid,
) -> Result<JobRow, AppError> {
    let job = fetch_job(pool, job_id).await?;
    if job.owner_id != recruiter_id {
        return Err(AppError::NotAuthorized);
    }
    Ok(job)
}
