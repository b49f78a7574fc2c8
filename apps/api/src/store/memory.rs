//! In-memory `JobStore` for pipeline tests. Enforces the same natural-key
//! semantics as the PostgreSQL schema: unique source names, one listing per
//! `(job_source_id, external_id)`, one match score per `(user_id,
//! job_listing_id)`.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::job::{JobListingRow, JobSourceRow};
use crate::models::matching::MatchScoreRow;
use crate::models::user::{ParsedCvRow, UserRow};
use crate::store::{
    JobListingUpsert, JobSourceUpsert, JobStore, NewMatchScore, StoreError,
};

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    sources: Vec<JobSourceRow>,
    listings: Vec<JobListingRow>,
    users: Vec<UserRow>,
    cvs: Vec<ParsedCvRow>,
    matches: Vec<MatchScoreRow>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, email: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().users.push(UserRow {
            id,
            email: email.map(str::to_string),
            created_at: Utc::now(),
        });
        id
    }

    pub fn add_parsed_cv(&self, user_id: Uuid, raw_text: &str) -> Uuid {
        self.add_parsed_cv_with(user_id, raw_text, json!({}), json!({}))
    }

    pub fn add_parsed_cv_with(
        &self,
        user_id: Uuid,
        raw_text: &str,
        skills: Value,
        profile: Value,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().cvs.push(ParsedCvRow {
            id,
            user_id,
            raw_text: Some(raw_text.to_string()),
            skills,
            profile,
            created_at: Utc::now(),
        });
        id
    }

    pub fn listings(&self) -> Vec<JobListingRow> {
        self.inner.lock().unwrap().listings.clone()
    }

    pub fn sources(&self) -> Vec<JobSourceRow> {
        self.inner.lock().unwrap().sources.clone()
    }

    pub fn matches(&self) -> Vec<MatchScoreRow> {
        self.inner.lock().unwrap().matches.clone()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn upsert_job_source(
        &self,
        upsert: JobSourceUpsert<'_>,
    ) -> Result<JobSourceRow, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(existing) = inner.sources.iter_mut().find(|s| s.name == upsert.name) {
            existing.kind = upsert.kind;
            existing.base_url = upsert.base_url.to_string();
            existing.is_active = true;
            existing.last_scraped_at = Some(upsert.last_scraped_at);
            return Ok(existing.clone());
        }

        let row = JobSourceRow {
            id: Uuid::new_v4(),
            name: upsert.name.to_string(),
            kind: upsert.kind,
            base_url: upsert.base_url.to_string(),
            is_active: true,
            last_scraped_at: Some(upsert.last_scraped_at),
            metadata: json!({}),
            created_at: Utc::now(),
        };
        inner.sources.push(row.clone());
        Ok(row)
    }

    async fn upsert_job_listing(
        &self,
        upsert: JobListingUpsert<'_>,
    ) -> Result<JobListingRow, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let post = upsert.post;
        let now = Utc::now();

        if let Some(existing) = inner.listings.iter_mut().find(|l| {
            l.job_source_id == upsert.job_source_id && l.external_id == post.external_id
        }) {
            existing.url = post.url.clone();
            existing.title = post.title.clone();
            existing.company = post.company.clone();
            existing.location = post.location.clone();
            existing.raw_description = post.raw_description.clone();
            existing.published_at = post.published_at;
            existing.last_synced_at = now;
            return Ok(existing.clone());
        }

        let row = JobListingRow {
            id: Uuid::new_v4(),
            job_source_id: upsert.job_source_id,
            external_id: post.external_id.clone(),
            url: post.url.clone(),
            title: post.title.clone(),
            company: post.company.clone(),
            location: post.location.clone(),
            raw_description: post.raw_description.clone(),
            published_at: post.published_at,
            last_synced_at: now,
            created_at: now,
        };
        inner.listings.push(row.clone());
        Ok(row)
    }

    async fn active_job_sources(&self) -> Result<Vec<JobSourceRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sources
            .iter()
            .filter(|s| s.is_active)
            .cloned()
            .collect())
    }

    async fn find_users(&self, user_id: Option<Uuid>) -> Result<Vec<UserRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .filter(|u| user_id.map_or(true, |id| u.id == id))
            .cloned()
            .collect())
    }

    async fn latest_parsed_cvs(&self, user_ids: &[Uuid]) -> Result<Vec<ParsedCvRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut latest: Vec<ParsedCvRow> = Vec::new();

        for cv in inner.cvs.iter().filter(|cv| user_ids.contains(&cv.user_id)) {
            match latest.iter().position(|l| l.user_id == cv.user_id) {
                // `>=` so the later insertion wins timestamp ties.
                Some(i) if cv.created_at >= latest[i].created_at => latest[i] = cv.clone(),
                Some(_) => {}
                None => latest.push(cv.clone()),
            }
        }

        Ok(latest)
    }

    async fn find_job_listings(
        &self,
        ids: Option<&[Uuid]>,
    ) -> Result<Vec<JobListingRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .listings
            .iter()
            .filter(|l| ids.map_or(true, |ids| ids.contains(&l.id)))
            .cloned()
            .collect())
    }

    async fn scored_listing_ids(
        &self,
        user_id: Uuid,
        listing_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .matches
            .iter()
            .filter(|m| m.user_id == user_id && listing_ids.contains(&m.job_listing_id))
            .map(|m| m.job_listing_id)
            .collect())
    }

    async fn create_match_score(
        &self,
        new: NewMatchScore<'_>,
    ) -> Result<MatchScoreRow, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        if inner
            .matches
            .iter()
            .any(|m| m.user_id == new.user_id && m.job_listing_id == new.job_listing_id)
        {
            return Err(StoreError::Conflict(format!(
                "match score already exists for user {} and listing {}",
                new.user_id, new.job_listing_id
            )));
        }

        let row = MatchScoreRow {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            job_listing_id: new.job_listing_id,
            score: new.score,
            explanation: new.explanation.to_string(),
            llm_model: new.llm_model.to_string(),
            status: new.status,
            notification_message_id: None,
            notified_at: None,
            created_at: Utc::now(),
        };
        inner.matches.push(row.clone());
        Ok(row)
    }
}
