use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One hiring stage within a job's pipeline.
/// `order_index` values for a job are always exactly `0..n-1`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoundRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub instructions: Option<String>,
    /// Schema for stage-specific forms. Opaque to the engine.
    pub custom_fields: Value,
    /// Named dimensions an evaluator scores, see `EvaluationCriterion`.
    pub evaluation_criteria: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A round plus how many submissions it has accumulated.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RoundWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub round: RoundRow,
    pub submission_count: i64,
}

/// One field definition in a round's stage-specific form schema.
/// Stored as JSON; the engine never interprets field semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFieldDef {
    pub name: String,
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

/// One named dimension an evaluator scores during a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationCriterion {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
}

fn default_max_score() -> f64 {
    10.0
}
