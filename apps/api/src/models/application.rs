use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::submission::SubmissionRow;

/// Overall status of a candidate's application.
///
/// `applied` is the initial state; `in_progress` means the application has
/// entered the round pipeline. Recruiters may set any status at any time
/// via the status-update endpoint (manual override, no legality matrix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    InProgress,
    Shortlisted,
    Rejected,
    Hired,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "applied" => Some(ApplicationStatus::Applied),
            "in_progress" => Some(ApplicationStatus::InProgress),
            "shortlisted" => Some(ApplicationStatus::Shortlisted),
            "rejected" => Some(ApplicationStatus::Rejected),
            "hired" => Some(ApplicationStatus::Hired),
            "withdrawn" => Some(ApplicationStatus::Withdrawn),
            _ => None,
        }
    }
}

/// One candidate's application to one job.
/// `current_round_id = NULL` means the application has not yet entered the
/// round pipeline; when set it always references a round of the same job.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub status: String,
    pub current_round_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An application together with its per-round submission records.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationWithSubmissions {
    #[serde(flatten)]
    pub application: ApplicationRow,
    pub submissions: Vec<SubmissionRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips() {
        for s in [
            ApplicationStatus::Applied,
            ApplicationStatus::InProgress,
            ApplicationStatus::Shortlisted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Hired,
            ApplicationStatus::Withdrawn,
        ] {
            assert_eq!(ApplicationStatus::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert_eq!(ApplicationStatus::parse("on_hold"), None);
        assert_eq!(ApplicationStatus::parse("APPLIED"), None);
    }
}
