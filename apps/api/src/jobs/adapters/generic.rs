//! Generic feed adapter — any source exposing a plain JSON array of postings
//! in the canonical field naming. The least trusted wire format, so every
//! field is checked individually.

use async_trait::async_trait;
use serde_json::Value;

use crate::jobs::adapters::{opt_rfc3339, opt_str, random_external_id, str_or_empty};
use crate::jobs::types::{AdapterError, JobAdapter, JobPost};
use crate::models::job::SourceKind;

pub struct GenericFeedAdapter {
    source_name: String,
    base_url: String,
    feed_url: String,
    http: reqwest::Client,
}

impl GenericFeedAdapter {
    pub fn new(http: reqwest::Client, source_name: &str, base_url: &str, feed_url: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            base_url: base_url.to_string(),
            feed_url: feed_url.to_string(),
            http,
        }
    }
}

#[async_trait]
impl JobAdapter for GenericFeedAdapter {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Generic
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobPost>, AdapterError> {
        let response = self.http.get(&self.feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await?;
        let items = payload.as_array().ok_or_else(|| {
            AdapterError::InvalidPayload("expected a JSON array of postings".to_string())
        })?;

        Ok(items.iter().map(normalize_item).collect())
    }
}

/// Best-effort normalization of one feed element. A malformed element yields
/// a `JobPost` with empty/absent fields, never an error.
fn normalize_item(raw: &Value) -> JobPost {
    let external_id = match raw.get("externalId").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => random_external_id(),
    };

    JobPost {
        external_id,
        url: opt_str(raw, "url"),
        title: str_or_empty(raw, "title"),
        company: str_or_empty(raw, "company"),
        location: opt_str(raw, "location"),
        raw_description: str_or_empty(raw, "rawDescription"),
        published_at: opt_rfc3339(raw, "publishedAt"),
    }
}
