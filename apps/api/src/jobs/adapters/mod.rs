//! Source adapters — one module per external job board wire format, plus the
//! factory that builds an adapter from a configured `job_sources` row.

pub mod generic;
pub mod greenhouse;
pub mod lever;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::jobs::types::JobAdapter;
use crate::models::job::{JobSourceRow, SourceKind};

use self::generic::GenericFeedAdapter;
use self::greenhouse::GreenhouseAdapter;
use self::lever::LeverAdapter;

/// Builds the adapter for a configured source. Adapter parameters come from
/// the row's `metadata` column; a missing key is a configuration error, not a
/// sync failure.
pub fn adapter_for_source(
    source: &JobSourceRow,
    http: &reqwest::Client,
) -> Result<Box<dyn JobAdapter>> {
    match source.kind {
        SourceKind::Generic => Ok(Box::new(GenericFeedAdapter::new(
            http.clone(),
            &source.name,
            &source.base_url,
            &metadata_str(source, "feed_url")?,
        ))),
        SourceKind::Greenhouse => Ok(Box::new(GreenhouseAdapter::new(
            http.clone(),
            &source.name,
            &source.base_url,
            &metadata_str(source, "board_token")?,
        ))),
        SourceKind::Lever => Ok(Box::new(LeverAdapter::new(
            http.clone(),
            &source.name,
            &source.base_url,
            &metadata_str(source, "company_handle")?,
        ))),
    }
}

fn metadata_str(source: &JobSourceRow, key: &str) -> Result<String> {
    source
        .metadata
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            anyhow!(
                "source '{}' is missing metadata key '{}'",
                source.name,
                key
            )
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Shared defensive JSON helpers
// ────────────────────────────────────────────────────────────────────────────

/// String field, degrading to `""` when missing or of the wrong type.
pub(crate) fn str_or_empty(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Optional string field; anything but a string becomes `None`.
pub(crate) fn opt_str(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

/// RFC 3339 timestamp field; unparseable values degrade to `None`.
pub(crate) fn opt_rfc3339(raw: &Value, key: &str) -> Option<DateTime<Utc>> {
    raw.get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Substitute dedup key for feeds that omit one. Random so two distinct
/// id-less postings never collide.
pub(crate) fn random_external_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(kind: SourceKind, metadata: Value) -> JobSourceRow {
        JobSourceRow {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            kind,
            base_url: "https://jobs.acme.example".to_string(),
            is_active: true,
            last_scraped_at: None,
            metadata,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_factory_builds_adapter_per_kind() {
        let http = reqwest::Client::new();

        let generic = source(SourceKind::Generic, json!({ "feed_url": "https://f.example" }));
        assert_eq!(
            adapter_for_source(&generic, &http).unwrap().kind(),
            SourceKind::Generic
        );

        let greenhouse = source(SourceKind::Greenhouse, json!({ "board_token": "acme" }));
        assert_eq!(
            adapter_for_source(&greenhouse, &http).unwrap().kind(),
            SourceKind::Greenhouse
        );

        let lever = source(SourceKind::Lever, json!({ "company_handle": "acme" }));
        assert_eq!(
            adapter_for_source(&lever, &http).unwrap().kind(),
            SourceKind::Lever
        );
    }

    #[test]
    fn test_factory_rejects_missing_metadata_key() {
        let http = reqwest::Client::new();
        let bad = source(SourceKind::Greenhouse, json!({}));
        let err = adapter_for_source(&bad, &http).unwrap_err();
        assert!(err.to_string().contains("board_token"));
    }

    #[test]
    fn test_str_or_empty_degrades_wrong_type() {
        let raw = json!({ "title": 42 });
        assert_eq!(str_or_empty(&raw, "title"), "");
    }

    #[test]
    fn test_opt_rfc3339_degrades_garbage() {
        let raw = json!({ "publishedAt": "not-a-date" });
        assert_eq!(opt_rfc3339(&raw, "publishedAt"), None);
    }
}
