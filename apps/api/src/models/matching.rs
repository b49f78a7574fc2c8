use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Workflow status of a match. The pipeline only ever writes `Pending` or
/// `ReadyForReview`; the approval workflow owns the later transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_score_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MatchScoreStatus {
    Pending,
    ReadyForReview,
    Archived,
}

/// Persisted result of scoring one (user, job listing) pair. At most one row
/// exists per pair. `llm_model` is either a real model identifier or the
/// heuristic sentinel, so consumers can tell the two scoring tiers apart.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchScoreRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_listing_id: Uuid,
    pub score: f64,
    pub explanation: String,
    pub llm_model: String,
    pub status: MatchScoreStatus,
    /// Delivery metadata, written by the notification worker.
    pub notification_message_id: Option<String>,
    pub notified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
