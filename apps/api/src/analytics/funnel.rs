//! Funnel Analytics: read-only per-round aggregation with drop-off rates.
//!
//! The aggregate queries are not pinned to a single snapshot; a short
//! staleness window between them is an accepted trade-off for a read that
//! takes no locks.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::ensure_job_owner;
use crate::errors::AppError;

/// Raw per-round submission volumes as they come back from the store.
#[derive(Debug, Clone, FromRow)]
pub struct RoundVolume {
    pub round_id: Uuid,
    pub name: String,
    pub order_index: i32,
    pub total_submissions: i64,
    pub completed: i64,
    pub in_progress: i64,
    pub pending: i64,
}

/// One round's slice of the funnel, including drop-off relative to the
/// previous stage.
#[derive(Debug, Clone, Serialize)]
pub struct RoundFunnel {
    pub round_id: Uuid,
    pub name: String,
    pub order_index: i32,
    pub total_submissions: i64,
    pub completed: i64,
    pub in_progress: i64,
    pub pending: i64,
    /// Percentage of the previous stage's volume that never reached this
    /// round. The first round is measured against total applications.
    pub drop_off_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct JobAnalytics {
    pub job_id: Uuid,
    pub total_applications: i64,
    pub status_counts: BTreeMap<String, i64>,
    pub rounds: Vec<RoundFunnel>,
}

/// Drop-off from `previous` to `current` volume, as a percentage.
/// Zero previous volume yields 0 rather than a division by zero.
pub fn drop_off_rate(previous: i64, current: i64) -> f64 {
    if previous <= 0 {
        return 0.0;
    }
    (previous - current) as f64 / previous as f64 * 100.0
}

/// Folds raw round volumes (ordered by index) into the funnel, chaining
/// each round's drop-off to its predecessor's volume.
pub fn build_funnel(total_applications: i64, volumes: Vec<RoundVolume>) -> Vec<RoundFunnel> {
    let mut previous = total_applications;
    volumes
        .into_iter()
        .map(|v| {
            let rate = drop_off_rate(previous, v.total_submissions);
            previous = v.total_submissions;
            RoundFunnel {
                round_id: v.round_id,
                name: v.name,
                order_index: v.order_index,
                total_submissions: v.total_submissions,
                completed: v.completed,
                in_progress: v.in_progress,
                pending: v.pending,
                drop_off_rate: rate,
            }
        })
        .collect()
}

/// Computes the full funnel for a job: total applications, status
/// breakdown, and per-round volumes with drop-off. Zero rounds or zero
/// applications produce empty/zero-filled results, never an error.
pub async fn get_job_analytics(
    pool: &PgPool,
    job_id: Uuid,
    recruiter_id: Uuid,
) -> Result<JobAnalytics, AppError> {
    ensure_job_owner(pool, job_id, recruiter_id).await?;

    let status_rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM applications WHERE job_id = $1 GROUP BY status",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    let status_counts: BTreeMap<String, i64> = status_rows.into_iter().collect();
    let total_applications: i64 = status_counts.values().sum();

    let volumes = sqlx::query_as::<_, RoundVolume>(
        r#"
        SELECT r.id AS round_id,
               r.name,
               r.order_index,
               COUNT(s.id) AS total_submissions,
               COUNT(s.id) FILTER (WHERE s.status = 'completed') AS completed,
               COUNT(s.id) FILTER (WHERE s.status = 'in_progress') AS in_progress,
               COUNT(s.id) FILTER (WHERE s.status = 'pending') AS pending
        FROM rounds r
        LEFT JOIN submissions s ON s.round_id = r.id
        WHERE r.job_id = $1
        GROUP BY r.id, r.name, r.order_index
        ORDER BY r.order_index ASC
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    Ok(JobAnalytics {
        job_id,
        total_applications,
        status_counts,
        rounds: build_funnel(total_applications, volumes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(index: i32, total: i64, completed: i64, in_progress: i64, pending: i64) -> RoundVolume {
        RoundVolume {
            round_id: Uuid::new_v4(),
            name: format!("Round {index}"),
            order_index: index,
            total_submissions: total,
            completed,
            in_progress,
            pending,
        }
    }

    #[test]
    fn test_drop_off_basic() {
        assert_eq!(drop_off_rate(10, 8), 20.0);
        assert_eq!(drop_off_rate(10, 10), 0.0);
        assert_eq!(drop_off_rate(4, 1), 75.0);
    }

    #[test]
    fn test_drop_off_zero_previous_is_zero() {
        assert_eq!(drop_off_rate(0, 0), 0.0);
        assert_eq!(drop_off_rate(0, 5), 0.0);
    }

    #[test]
    fn test_two_stage_funnel() {
        // 10 applications; R0 has 10 submissions (8 completed, 2 in
        // progress); R1 has 8 (3 completed, 5 pending).
        let funnel = build_funnel(
            10,
            vec![volume(0, 10, 8, 2, 0), volume(1, 8, 3, 0, 5)],
        );

        assert_eq!(funnel.len(), 2);
        assert_eq!(funnel[0].drop_off_rate, 0.0);
        assert_eq!(funnel[0].completed, 8);
        assert_eq!(funnel[0].in_progress, 2);
        assert_eq!(funnel[1].drop_off_rate, 20.0);
        assert_eq!(funnel[1].pending, 5);
    }

    #[test]
    fn test_empty_funnel() {
        assert!(build_funnel(0, vec![]).is_empty());
    }

    #[test]
    fn test_rounds_with_no_applications_report_zero_drop_off() {
        let funnel = build_funnel(0, vec![volume(0, 0, 0, 0, 0), volume(1, 0, 0, 0, 0)]);
        assert_eq!(funnel[0].drop_off_rate, 0.0);
        assert_eq!(funnel[1].drop_off_rate, 0.0);
    }
}
