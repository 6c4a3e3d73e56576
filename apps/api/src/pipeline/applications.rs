//! Application operations: listing, direct status edits, and pipeline
//! advancement.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::ensure_job_owner;
use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus, ApplicationWithSubmissions};
use crate::models::submission::{SubmissionRow, SubmissionStatus};
use crate::pipeline::state_machine::{plan_advance, AdvanceStep, PageBounds};

#[derive(Debug, Default)]
pub struct ApplicationFilter {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationPage {
    pub applications: Vec<ApplicationWithSubmissions>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Loads an application or fails with `NotFound`.
pub async fn fetch_application(
    pool: &PgPool,
    application_id: Uuid,
) -> Result<ApplicationRow, AppError> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(application_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))
}

/// Returns a page of a job's applications, each with its submissions.
/// `status` filters exactly; `search` matches candidate name or email.
pub async fn list_applications(
    pool: &PgPool,
    job_id: Uuid,
    recruiter_id: Uuid,
    filter: ApplicationFilter,
) -> Result<ApplicationPage, AppError> {
    ensure_job_owner(pool, job_id, recruiter_id).await?;

    if let Some(status) = &filter.status {
        if ApplicationStatus::parse(status).is_none() {
            return Err(AppError::Validation(format!("Unknown status '{status}'")));
        }
    }

    let bounds = PageBounds::clamp(filter.page, filter.limit);
    let search = filter
        .search
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| format!("%{}%", s.trim()));

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM applications
        WHERE job_id = $1
          AND ($2::text IS NULL OR status = $2)
          AND ($3::text IS NULL OR candidate_name ILIKE $3 OR candidate_email ILIKE $3)
        "#,
    )
    .bind(job_id)
    .bind(&filter.status)
    .bind(&search)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, ApplicationRow>(
        r#"
        SELECT * FROM applications
        WHERE job_id = $1
          AND ($2::text IS NULL OR status = $2)
          AND ($3::text IS NULL OR candidate_name ILIKE $3 OR candidate_email ILIKE $3)
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(job_id)
    .bind(&filter.status)
    .bind(&search)
    .bind(bounds.limit)
    .bind(bounds.offset())
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = rows.iter().map(|a| a.id).collect();
    let submissions = sqlx::query_as::<_, SubmissionRow>(
        "SELECT * FROM submissions WHERE application_id = ANY($1) ORDER BY created_at ASC",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_application: HashMap<Uuid, Vec<SubmissionRow>> = HashMap::new();
    for submission in submissions {
        by_application
            .entry(submission.application_id)
            .or_default()
            .push(submission);
    }

    let applications = rows
        .into_iter()
        .map(|application| ApplicationWithSubmissions {
            submissions: by_application.remove(&application.id).unwrap_or_default(),
            application,
        })
        .collect();

    Ok(ApplicationPage {
        applications,
        total,
        page: bounds.page,
        limit: bounds.limit,
    })
}

/// Returns one application with its submissions, authorized against the
/// owning job.
pub async fn get_application(
    pool: &PgPool,
    application_id: Uuid,
    recruiter_id: Uuid,
) -> Result<ApplicationWithSubmissions, AppError> {
    let application = fetch_application(pool, application_id).await?;
    ensure_job_owner(pool, application.job_id, recruiter_id).await?;

    let submissions = sqlx::query_as::<_, SubmissionRow>(
        "SELECT * FROM submissions WHERE application_id = $1 ORDER BY created_at ASC",
    )
    .bind(application_id)
    .fetch_all(pool)
    .await?;

    Ok(ApplicationWithSubmissions {
        application,
        submissions,
    })
}

/// Direct recruiter-driven status edit. Deliberately unrestricted: any
/// status may follow any status, so a recruiter can always override the
/// pipeline's own bookkeeping.
pub async fn update_status(
    pool: &PgPool,
    application_id: Uuid,
    recruiter_id: Uuid,
    new_status: ApplicationStatus,
) -> Result<ApplicationRow, AppError> {
    let application = fetch_application(pool, application_id).await?;
    ensure_job_owner(pool, application.job_id, recruiter_id).await?;

    let updated = sqlx::query_as::<_, ApplicationRow>(
        "UPDATE applications SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(new_status.as_str())
    .bind(application_id)
    .fetch_one(pool)
    .await?;

    info!(
        "Application {application_id} status {} -> {}",
        application.status, updated.status
    );
    Ok(updated)
}

/// Moves an application one step through its job's round pipeline.
///
/// Exhausting the pipeline sets the status to shortlisted and leaves the
/// current-round pointer untouched; hiring stays a manual status edit.
/// Entering a round upserts the (application, round) submission so a
/// repeated visit resets the existing row instead of failing on the unique
/// key.
pub async fn advance(
    pool: &PgPool,
    application_id: Uuid,
    recruiter_id: Uuid,
) -> Result<ApplicationRow, AppError> {
    let application = fetch_application(pool, application_id).await?;
    ensure_job_owner(pool, application.job_id, recruiter_id).await?;

    let ordered_rounds: Vec<Uuid> = sqlx::query_scalar(
        "SELECT id FROM rounds WHERE job_id = $1 ORDER BY order_index ASC",
    )
    .bind(application.job_id)
    .fetch_all(pool)
    .await?;

    let step = plan_advance(&ordered_rounds, application.current_round_id)
        .ok_or(AppError::NoRoundsDefined)?;

    let mut tx = pool.begin().await?;

    let updated = match step {
        AdvanceStep::Shortlist => {
            sqlx::query_as::<_, ApplicationRow>(
                "UPDATE applications SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
            )
            .bind(ApplicationStatus::Shortlisted.as_str())
            .bind(application_id)
            .fetch_one(&mut *tx)
            .await?
        }
        AdvanceStep::Enter(next_round_id) => {
            let updated = sqlx::query_as::<_, ApplicationRow>(
                r#"
                UPDATE applications
                SET status = $1, current_round_id = $2, updated_at = now()
                WHERE id = $3
                RETURNING *
                "#,
            )
            .bind(ApplicationStatus::InProgress.as_str())
            .bind(next_round_id)
            .bind(application_id)
            .fetch_one(&mut *tx)
            .await?;

            // Idempotent re-entry: a prior submission for this round is
            // reset rather than duplicated.
            sqlx::query(
                r#"
                INSERT INTO submissions (application_id, round_id, status)
                VALUES ($1, $2, $3)
                ON CONFLICT (application_id, round_id)
                DO UPDATE SET status = EXCLUDED.status, updated_at = now()
                "#,
            )
            .bind(application_id)
            .bind(next_round_id)
            .bind(SubmissionStatus::InProgress.as_str())
            .execute(&mut *tx)
            .await?;

            updated
        }
    };

    tx.commit().await?;
    info!(
        "Advanced application {application_id}: status {}, round {:?}",
        updated.status, updated.current_round_id
    );
    Ok(updated)
}
