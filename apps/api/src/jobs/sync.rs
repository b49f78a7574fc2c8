//! Sync engine: pulls postings through the configured adapters and reconciles
//! them against persisted listings without duplication.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::jobs::types::JobAdapter;
use crate::store::{JobListingUpsert, JobSourceUpsert, JobStore, StoreError};

/// Outcome of one sync run. `sources_synced` counts attempted sources, so a
/// source whose fetch failed still appears in the total alongside its entry
/// in `errors`.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub sources_synced: usize,
    pub listings_upserted: usize,
    pub errors: Vec<SourceSyncError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSyncError {
    pub source: String,
    pub error: String,
}

/// Runs one sync pass over `adapters`, in order.
///
/// Per source: the `job_sources` row is refreshed first so bookkeeping stays
/// current even when the subsequent fetch fails; a fetch failure is recorded
/// and the engine moves on to the next source. Listing upserts are keyed by
/// `(job_source_id, external_id)`, so repeated runs update rows in place.
/// Store failures abort the invocation.
pub async fn sync_jobs(
    store: &dyn JobStore,
    adapters: &[Box<dyn JobAdapter>],
) -> Result<SyncReport, StoreError> {
    let mut report = SyncReport {
        sources_synced: 0,
        listings_upserted: 0,
        errors: Vec::new(),
    };

    for adapter in adapters {
        let source = store
            .upsert_job_source(JobSourceUpsert {
                name: adapter.source_name(),
                kind: adapter.kind(),
                base_url: adapter.base_url(),
                last_scraped_at: Utc::now(),
            })
            .await?;

        report.sources_synced += 1;

        let posts = match adapter.fetch_jobs().await {
            Ok(posts) => posts,
            Err(e) => {
                warn!("fetch failed for source '{}': {e}", source.name);
                report.errors.push(SourceSyncError {
                    source: source.name.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        for post in &posts {
            store
                .upsert_job_listing(JobListingUpsert {
                    job_source_id: source.id,
                    post,
                })
                .await?;
            report.listings_upserted += 1;
        }

        info!("synced {} listings from '{}'", posts.len(), source.name);
    }

    Ok(report)
}
