//! Persistence seam for the pipeline. The sync engine and matcher only ever
//! talk to `JobStore`, so pipeline behavior is testable against the in-memory
//! implementation with no network, no database, no Docker.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::jobs::types::JobPost;
use crate::models::job::{JobListingRow, JobSourceRow, SourceKind};
use crate::models::matching::{MatchScoreRow, MatchScoreStatus};
use crate::models::user::{ParsedCvRow, UserRow};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Natural-key uniqueness violation surfaced by the backing store.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Fields refreshed on a `job_sources` upsert keyed by `name`.
pub struct JobSourceUpsert<'a> {
    pub name: &'a str,
    pub kind: SourceKind,
    pub base_url: &'a str,
    pub last_scraped_at: DateTime<Utc>,
}

/// One listing upsert keyed by `(job_source_id, external_id)`.
pub struct JobListingUpsert<'a> {
    pub job_source_id: Uuid,
    pub post: &'a JobPost,
}

pub struct NewMatchScore<'a> {
    pub user_id: Uuid,
    pub job_listing_id: Uuid,
    pub score: f64,
    pub explanation: &'a str,
    pub llm_model: &'a str,
    pub status: MatchScoreStatus,
}

/// The storage operations the pipeline needs: upsert-by-natural-key for
/// sources and listings, filtered finds, and match-score creation. Upserts
/// must be atomic per row; the uniqueness constraint, not read-then-write
/// logic, is what keeps concurrent writers duplicate-free.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn upsert_job_source(
        &self,
        upsert: JobSourceUpsert<'_>,
    ) -> Result<JobSourceRow, StoreError>;

    async fn upsert_job_listing(
        &self,
        upsert: JobListingUpsert<'_>,
    ) -> Result<JobListingRow, StoreError>;

    async fn active_job_sources(&self) -> Result<Vec<JobSourceRow>, StoreError>;

    async fn find_users(&self, user_id: Option<Uuid>) -> Result<Vec<UserRow>, StoreError>;

    /// Most recent parsed CV per user, batched over `user_ids`.
    async fn latest_parsed_cvs(&self, user_ids: &[Uuid]) -> Result<Vec<ParsedCvRow>, StoreError>;

    async fn find_job_listings(
        &self,
        ids: Option<&[Uuid]>,
    ) -> Result<Vec<JobListingRow>, StoreError>;

    /// Listing ids already scored for `user_id`, restricted to the candidate
    /// set. One batched read, not one query per listing.
    async fn scored_listing_ids(
        &self,
        user_id: Uuid,
        listing_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, StoreError>;

    async fn create_match_score(
        &self,
        new: NewMatchScore<'_>,
    ) -> Result<MatchScoreRow, StoreError>;
}
