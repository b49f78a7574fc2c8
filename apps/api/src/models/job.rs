use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Which adapter implementation serves a configured source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "source_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Generic,
    Greenhouse,
    Lever,
}

/// A configured origin of job postings. `name` is the stable upsert key;
/// `metadata` carries the adapter configuration (feed URL, board token or
/// company handle, depending on `kind`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobSourceRow {
    pub id: Uuid,
    pub name: String,
    pub kind: SourceKind,
    pub base_url: String,
    pub is_active: bool,
    pub last_scraped_at: Option<DateTime<Utc>>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

/// One persisted posting. `(job_source_id, external_id)` is the natural key:
/// re-syncing the same posting always lands on the same row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobListingRow {
    pub id: Uuid,
    pub job_source_id: Uuid,
    pub external_id: String,
    pub url: Option<String>,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub raw_description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub last_synced_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
