//! Greenhouse board adapter. Talks to the fixed public board API,
//! parameterized by the board token from source metadata.

use async_trait::async_trait;
use serde_json::Value;

use crate::jobs::adapters::{opt_rfc3339, opt_str, random_external_id, str_or_empty};
use crate::jobs::types::{AdapterError, JobAdapter, JobPost};
use crate::models::job::SourceKind;

const BOARD_API_URL: &str = "https://boards-api.greenhouse.io/v1/boards";

pub struct GreenhouseAdapter {
    source_name: String,
    base_url: String,
    board_token: String,
    http: reqwest::Client,
}

impl GreenhouseAdapter {
    pub fn new(http: reqwest::Client, source_name: &str, base_url: &str, board_token: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            base_url: base_url.to_string(),
            board_token: board_token.to_string(),
            http,
        }
    }

    /// Maps one board entry onto the canonical shape. Greenhouse has no
    /// company field — the board IS the company, so the source name is used.
    fn normalize(&self, job: &Value) -> JobPost {
        // Board ids arrive as numbers; older postings occasionally as strings.
        let external_id = match job.get("id") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => random_external_id(),
        };

        JobPost {
            external_id,
            url: opt_str(job, "absolute_url"),
            title: str_or_empty(job, "title"),
            company: self.source_name.clone(),
            location: job
                .get("location")
                .and_then(|l| l.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
            raw_description: str_or_empty(job, "content"),
            published_at: opt_rfc3339(job, "updated_at"),
        }
    }
}

#[async_trait]
impl JobAdapter for GreenhouseAdapter {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Greenhouse
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobPost>, AdapterError> {
        let feed_url = format!("{BOARD_API_URL}/{}/jobs", self.board_token);

        let response = self.http.get(&feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await?;
        // A board with no `jobs` array simply has nothing published.
        let jobs = payload
            .get("jobs")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(jobs.iter().map(|job| self.normalize(job)).collect())
    }
}
