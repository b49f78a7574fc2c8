use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::job::SourceKind;

/// Canonical normalized posting produced by an adapter. Transient: the sync
/// engine maps it into a `job_listings` row, it is never persisted directly.
/// `external_id` is the source-scoped dedup key and is always present; an
/// adapter facing a feed without one substitutes a random identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct JobPost {
    pub external_id: String,
    pub url: Option<String>,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub raw_description: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Transport-level fetch failures. Per-item malformation is never an error;
/// adapters degrade bad fields to empty or absent values instead.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("source returned status {status}")]
    Status { status: u16 },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// One external job board, normalized. Each implementation encapsulates
/// exactly one source's wire format and is a pure transform over the fetched
/// response, so it can be unit-tested on raw JSON without any network.
#[async_trait]
pub trait JobAdapter: Send + Sync {
    /// Stable unique name; the upsert key for the `job_sources` row.
    fn source_name(&self) -> &str;

    /// Informational URL recorded on the source row. Adapters derive their
    /// fetch endpoint from configuration, never by parsing this value.
    fn base_url(&self) -> &str;

    fn kind(&self) -> SourceKind;

    async fn fetch_jobs(&self) -> Result<Vec<JobPost>, AdapterError>;
}

impl std::fmt::Debug for dyn JobAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobAdapter")
            .field("source_name", &self.source_name())
            .field("kind", &self.kind())
            .finish()
    }
}
