//! Lever postings adapter. Talks to the fixed public postings API,
//! parameterized by the company handle from source metadata.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::jobs::adapters::{opt_str, random_external_id, str_or_empty};
use crate::jobs::types::{AdapterError, JobAdapter, JobPost};
use crate::models::job::SourceKind;

const POSTINGS_API_URL: &str = "https://api.lever.co/v0/postings";

pub struct LeverAdapter {
    source_name: String,
    base_url: String,
    company_handle: String,
    http: reqwest::Client,
}

impl LeverAdapter {
    pub fn new(
        http: reqwest::Client,
        source_name: &str,
        base_url: &str,
        company_handle: &str,
    ) -> Self {
        Self {
            source_name: source_name.to_string(),
            base_url: base_url.to_string(),
            company_handle: company_handle.to_string(),
            http,
        }
    }

    fn normalize(&self, job: &Value) -> JobPost {
        let external_id = match job.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => random_external_id(),
        };

        JobPost {
            external_id,
            url: opt_str(job, "hostedUrl"),
            title: str_or_empty(job, "text"),
            company: self.source_name.clone(),
            location: job
                .get("categories")
                .and_then(|c| c.get("location"))
                .and_then(Value::as_str)
                .map(str::to_string),
            raw_description: str_or_empty(job, "descriptionPlain"),
            // Lever reports creation time as epoch milliseconds.
            published_at: job
                .get("createdAt")
                .and_then(Value::as_i64)
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        }
    }
}

#[async_trait]
impl JobAdapter for LeverAdapter {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Lever
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobPost>, AdapterError> {
        let feed_url = format!("{POSTINGS_API_URL}/{}?mode=json", self.company_handle);

        let response = self.http.get(&feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await?;
        let jobs = payload.as_array().ok_or_else(|| {
            AdapterError::InvalidPayload("expected a JSON array of postings".to_string())
        })?;

        Ok(jobs.iter().map(|job| self.normalize(job)).collect())
    }
}
