//! Round Directory: owns the ordered list of stages belonging to a job.
//!
//! Every multi-row mutation (delete + re-compaction, two-phase reorder)
//! runs inside one transaction so the dense-index invariant holds at every
//! commit point, not just eventually.

use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::auth::ensure_job_owner;
use crate::errors::AppError;
use crate::models::round::{CustomFieldDef, EvaluationCriterion, RoundRow, RoundWithCount};
use crate::rounds::ordering::{
    compaction_plan, is_identity, validate_permutation, ReorderEntry, REORDER_OFFSET,
};

#[derive(Debug, Deserialize)]
pub struct CreateRound {
    pub name: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    #[serde(default)]
    pub custom_fields: Option<Value>,
    #[serde(default)]
    pub evaluation_criteria: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRound {
    pub name: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub custom_fields: Option<Value>,
    pub evaluation_criteria: Option<Value>,
}

/// Checks that a submitted schema array deserializes into the expected
/// definition shape. The engine never interprets the definitions beyond
/// this; stage-specific form semantics live in the presentation layer.
fn validate_field_schema(custom_fields: Option<&Value>) -> Result<(), AppError> {
    if let Some(fields) = custom_fields {
        serde_json::from_value::<Vec<CustomFieldDef>>(fields.clone())
            .map_err(|e| AppError::Validation(format!("Invalid custom field definitions: {e}")))?;
    }
    Ok(())
}

fn validate_criteria_schema(criteria: Option<&Value>) -> Result<(), AppError> {
    if let Some(criteria) = criteria {
        serde_json::from_value::<Vec<EvaluationCriterion>>(criteria.clone())
            .map_err(|e| AppError::Validation(format!("Invalid evaluation criteria: {e}")))?;
    }
    Ok(())
}

/// Appends a new round at the end of the job's pipeline.
/// The index is computed inside the INSERT so two concurrent creates can
/// only race into a unique-constraint violation, never a silent gap.
pub async fn create_round(
    pool: &PgPool,
    job_id: Uuid,
    recruiter_id: Uuid,
    data: CreateRound,
) -> Result<RoundRow, AppError> {
    ensure_job_owner(pool, job_id, recruiter_id).await?;
    validate_field_schema(data.custom_fields.as_ref())?;
    validate_criteria_schema(data.evaluation_criteria.as_ref())?;

    let round = sqlx::query_as::<_, RoundRow>(
        r#"
        INSERT INTO rounds
            (job_id, name, description, instructions, custom_fields, evaluation_criteria, order_index)
        SELECT $1, $2, $3, $4, $5, $6, COALESCE(MAX(order_index) + 1, 0)
        FROM rounds
        WHERE job_id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.instructions)
    .bind(data.custom_fields.unwrap_or_else(|| Value::Array(vec![])))
    .bind(
        data.evaluation_criteria
            .unwrap_or_else(|| Value::Array(vec![])),
    )
    .fetch_one(pool)
    .await?;

    info!(
        "Created round {} at index {} for job {job_id}",
        round.id, round.order_index
    );
    Ok(round)
}

/// Returns the job's rounds ordered by index, each with its submission count.
pub async fn list_rounds(
    pool: &PgPool,
    job_id: Uuid,
    recruiter_id: Uuid,
) -> Result<Vec<RoundWithCount>, AppError> {
    ensure_job_owner(pool, job_id, recruiter_id).await?;

    Ok(sqlx::query_as::<_, RoundWithCount>(
        r#"
        SELECT r.*, COUNT(s.id) AS submission_count
        FROM rounds r
        LEFT JOIN submissions s ON s.round_id = r.id
        WHERE r.job_id = $1
        GROUP BY r.id
        ORDER BY r.order_index ASC
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?)
}

/// Updates non-ordering fields in place. Omitted fields keep their value.
pub async fn update_round(
    pool: &PgPool,
    job_id: Uuid,
    round_id: Uuid,
    recruiter_id: Uuid,
    data: UpdateRound,
) -> Result<RoundRow, AppError> {
    ensure_job_owner(pool, job_id, recruiter_id).await?;
    validate_field_schema(data.custom_fields.as_ref())?;
    validate_criteria_schema(data.evaluation_criteria.as_ref())?;

    sqlx::query_as::<_, RoundRow>(
        r#"
        UPDATE rounds
        SET name = COALESCE($3, name),
            description = COALESCE($4, description),
            instructions = COALESCE($5, instructions),
            custom_fields = COALESCE($6, custom_fields),
            evaluation_criteria = COALESCE($7, evaluation_criteria),
            updated_at = now()
        WHERE id = $1 AND job_id = $2
        RETURNING *
        "#,
    )
    .bind(round_id)
    .bind(job_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.instructions)
    .bind(&data.custom_fields)
    .bind(&data.evaluation_criteria)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Round {round_id} not found for job {job_id}")))
}

/// Deletes a round, then re-compacts the survivors' indices back to a
/// contiguous `0..n-1` range inside the same transaction. Submissions for
/// the round go with it via the FK cascade.
pub async fn delete_round(
    pool: &PgPool,
    job_id: Uuid,
    round_id: Uuid,
    recruiter_id: Uuid,
) -> Result<(), AppError> {
    ensure_job_owner(pool, job_id, recruiter_id).await?;

    let mut tx = pool.begin().await?;

    let deleted: Option<(Uuid,)> =
        sqlx::query_as("DELETE FROM rounds WHERE id = $1 AND job_id = $2 RETURNING id")
            .bind(round_id)
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await?;
    if deleted.is_none() {
        return Err(AppError::NotFound(format!(
            "Round {round_id} not found for job {job_id}"
        )));
    }

    let remaining: Vec<(Uuid, i32)> = sqlx::query_as(
        "SELECT id, order_index FROM rounds WHERE job_id = $1 ORDER BY order_index ASC",
    )
    .bind(job_id)
    .fetch_all(&mut *tx)
    .await?;

    for (id, new_index) in compaction_plan(&remaining) {
        sqlx::query("UPDATE rounds SET order_index = $1, updated_at = now() WHERE id = $2")
            .bind(new_index)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    info!("Deleted round {round_id} from job {job_id} and re-compacted indices");
    Ok(())
}

/// Applies a full permutation of the job's rounds atomically.
///
/// Validation runs before any write; the write itself is two-phase: every
/// round is first relabeled to `new_index + REORDER_OFFSET`, then to its
/// true index. The (job_id, order_index) uniqueness constraint is checked
/// per statement, so a naive single-phase swap would abort mid-way.
pub async fn reorder_rounds(
    pool: &PgPool,
    job_id: Uuid,
    recruiter_id: Uuid,
    entries: Vec<ReorderEntry>,
) -> Result<Vec<RoundRow>, AppError> {
    ensure_job_owner(pool, job_id, recruiter_id).await?;

    let mut tx = pool.begin().await?;

    let existing: Vec<(Uuid, i32)> = sqlx::query_as(
        "SELECT id, order_index FROM rounds WHERE job_id = $1 ORDER BY order_index ASC",
    )
    .bind(job_id)
    .fetch_all(&mut *tx)
    .await?;

    let existing_ids: Vec<Uuid> = existing.iter().map(|&(id, _)| id).collect();
    let plan =
        validate_permutation(&existing_ids, &entries).map_err(AppError::InvalidPermutation)?;

    let current: HashMap<Uuid, i32> = existing.into_iter().collect();
    if !is_identity(&current, &plan) {
        // Phase one: move everything out of the live index range.
        for &(id, new_index) in &plan {
            sqlx::query("UPDATE rounds SET order_index = $1 WHERE id = $2")
                .bind(new_index + REORDER_OFFSET)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        // Phase two: settle each round at its requested index.
        for &(id, new_index) in &plan {
            sqlx::query("UPDATE rounds SET order_index = $1, updated_at = now() WHERE id = $2")
                .bind(new_index)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
    }

    let reordered = sqlx::query_as::<_, RoundRow>(
        "SELECT * FROM rounds WHERE job_id = $1 ORDER BY order_index ASC",
    )
    .bind(job_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("Reordered {} rounds for job {job_id}", reordered.len());
    Ok(reordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_schema_accepts_typical_form() {
        let fields = json!([
            {"name": "github_url", "field_type": "url", "required": true},
            {"name": "notice_period", "field_type": "text"}
        ]);
        assert!(validate_field_schema(Some(&fields)).is_ok());
        assert!(validate_field_schema(None).is_ok());
    }

    #[test]
    fn test_field_schema_rejects_malformed_entries() {
        let fields = json!([{"field_type": "text"}]); // missing name
        assert!(matches!(
            validate_field_schema(Some(&fields)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_criteria_schema_defaults_max_score() {
        let criteria = json!([{"name": "problem_solving", "description": null}]);
        assert!(validate_criteria_schema(Some(&criteria)).is_ok());

        let parsed: Vec<EvaluationCriterion> =
            serde_json::from_value(criteria).expect("criteria should parse");
        assert_eq!(parsed[0].max_score, 10.0);
    }

    #[test]
    fn test_criteria_schema_rejects_non_array() {
        let criteria = json!({"name": "communication"});
        assert!(matches!(
            validate_criteria_schema(Some(&criteria)),
            Err(AppError::Validation(_))
        ));
    }
}

