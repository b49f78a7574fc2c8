use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Owned by the auth layer; the pipeline only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user's structured CV as produced by the (external) CV-parsing subsystem.
/// The matcher reads `raw_text`, `skills` and `profile`; when a user has
/// several rows, only the most recently created one is used.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ParsedCvRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub raw_text: Option<String>,
    pub skills: Value,
    pub profile: Value,
    pub created_at: DateTime<Utc>,
}
