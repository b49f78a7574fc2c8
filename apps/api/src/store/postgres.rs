//! PostgreSQL-backed `JobStore`. All upserts go through
//! `INSERT ... ON CONFLICT` against the natural keys so concurrent syncs of
//! the same source cannot produce duplicate rows.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::job::{JobListingRow, JobSourceRow};
use crate::models::matching::MatchScoreRow;
use crate::models::user::{ParsedCvRow, UserRow};
use crate::store::{
    JobListingUpsert, JobSourceUpsert, JobStore, NewMatchScore, StoreError,
};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn upsert_job_source(
        &self,
        upsert: JobSourceUpsert<'_>,
    ) -> Result<JobSourceRow, StoreError> {
        Ok(sqlx::query_as::<_, JobSourceRow>(
            r#"
            INSERT INTO job_sources (name, kind, base_url, is_active, last_scraped_at)
            VALUES ($1, $2, $3, TRUE, $4)
            ON CONFLICT (name) DO UPDATE
            SET kind = EXCLUDED.kind,
                base_url = EXCLUDED.base_url,
                is_active = TRUE,
                last_scraped_at = EXCLUDED.last_scraped_at
            RETURNING *
            "#,
        )
        .bind(upsert.name)
        .bind(upsert.kind)
        .bind(upsert.base_url)
        .bind(upsert.last_scraped_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn upsert_job_listing(
        &self,
        upsert: JobListingUpsert<'_>,
    ) -> Result<JobListingRow, StoreError> {
        let post = upsert.post;
        Ok(sqlx::query_as::<_, JobListingRow>(
            r#"
            INSERT INTO job_listings
                (job_source_id, external_id, url, title, company, location,
                 raw_description, published_at, last_synced_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
            ON CONFLICT (job_source_id, external_id) DO UPDATE
            SET url = EXCLUDED.url,
                title = EXCLUDED.title,
                company = EXCLUDED.company,
                location = EXCLUDED.location,
                raw_description = EXCLUDED.raw_description,
                published_at = EXCLUDED.published_at,
                last_synced_at = now()
            RETURNING *
            "#,
        )
        .bind(upsert.job_source_id)
        .bind(&post.external_id)
        .bind(post.url.as_deref())
        .bind(&post.title)
        .bind(&post.company)
        .bind(post.location.as_deref())
        .bind(&post.raw_description)
        .bind(post.published_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn active_job_sources(&self) -> Result<Vec<JobSourceRow>, StoreError> {
        Ok(sqlx::query_as::<_, JobSourceRow>(
            "SELECT * FROM job_sources WHERE is_active ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_users(&self, user_id: Option<Uuid>) -> Result<Vec<UserRow>, StoreError> {
        Ok(sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, created_at
            FROM users
            WHERE $1::uuid IS NULL OR id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn latest_parsed_cvs(&self, user_ids: &[Uuid]) -> Result<Vec<ParsedCvRow>, StoreError> {
        Ok(sqlx::query_as::<_, ParsedCvRow>(
            r#"
            SELECT DISTINCT ON (user_id) *
            FROM parsed_cvs
            WHERE user_id = ANY($1)
            ORDER BY user_id, created_at DESC
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_job_listings(
        &self,
        ids: Option<&[Uuid]>,
    ) -> Result<Vec<JobListingRow>, StoreError> {
        Ok(sqlx::query_as::<_, JobListingRow>(
            r#"
            SELECT * FROM job_listings
            WHERE $1::uuid[] IS NULL OR id = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn scored_listing_ids(
        &self,
        user_id: Uuid,
        listing_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, StoreError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT job_listing_id FROM match_scores WHERE user_id = $1 AND job_listing_id = ANY($2)",
        )
        .bind(user_id)
        .bind(listing_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn create_match_score(
        &self,
        new: NewMatchScore<'_>,
    ) -> Result<MatchScoreRow, StoreError> {
        sqlx::query_as::<_, MatchScoreRow>(
            r#"
            INSERT INTO match_scores
                (user_id, job_listing_id, score, explanation, llm_model, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(new.job_listing_id)
        .bind(new.score)
        .bind(new.explanation)
        .bind(new.llm_model)
        .bind(new.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(
                format!(
                    "match score already exists for user {} and listing {}",
                    new.user_id, new.job_listing_id
                ),
            ),
            _ => StoreError::Database(e),
        })
    }
}
