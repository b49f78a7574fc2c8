//! Matcher: scores every not-yet-scored (user, listing) pair and persists the
//! result exactly once per pair.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::matching::scoring::MatchScorer;
use crate::models::matching::MatchScoreStatus;
use crate::models::user::ParsedCvRow;
use crate::store::{JobStore, NewMatchScore, StoreError};

/// Scores at or above this go straight to review; the rest wait as pending.
pub const READY_FOR_REVIEW_THRESHOLD: f64 = 0.75;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchRequest {
    pub user_id: Option<Uuid>,
    pub job_listing_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub created: usize,
}

/// Runs one matching pass. Safe to invoke repeatedly (cron-triggered): the
/// already-scored set is re-derived fresh per invocation, so a second call
/// with identical inputs creates nothing.
pub async fn match_jobs(
    store: &dyn JobStore,
    scorer: &dyn MatchScorer,
    request: MatchRequest,
) -> Result<MatchReport, StoreError> {
    let users = store.find_users(request.user_id).await?;
    let user_ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();

    let mut cvs: HashMap<Uuid, ParsedCvRow> = store
        .latest_parsed_cvs(&user_ids)
        .await?
        .into_iter()
        .map(|cv| (cv.user_id, cv))
        .collect();

    let listings = store
        .find_job_listings(request.job_listing_ids.as_deref())
        .await?;
    let listing_ids: Vec<Uuid> = listings.iter().map(|l| l.id).collect();

    let mut created = 0;

    for user in &users {
        let Some(cv) = cvs.remove(&user.id) else {
            debug!("user {} has no parsed CV, skipping", user.id);
            continue;
        };

        // One batched read per user, taken before any write in this pass.
        let already_scored = store.scored_listing_ids(user.id, &listing_ids).await?;

        for listing in &listings {
            if already_scored.contains(&listing.id) {
                continue;
            }

            let scored = scorer.score(user, &cv, listing).await;
            let status = if scored.score >= READY_FOR_REVIEW_THRESHOLD {
                MatchScoreStatus::ReadyForReview
            } else {
                MatchScoreStatus::Pending
            };

            store
                .create_match_score(NewMatchScore {
                    user_id: user.id,
                    job_listing_id: listing.id,
                    score: scored.score,
                    explanation: &scored.explanation,
                    llm_model: &scored.model,
                    status,
                })
                .await?;

            created += 1;
        }
    }

    info!("matching pass created {created} match scores");
    Ok(MatchReport { created })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::jobs::types::JobPost;
    use crate::matching::scoring::{HeuristicScorer, HEURISTIC_MODEL};
    use crate::store::memory::MemoryStore;
    use crate::store::{JobListingUpsert, JobSourceUpsert};
    use crate::models::job::SourceKind;

    const CV_TEXT: &str = "Experienced frontend engineer. React TypeScript Next.js.";

    async fn seed_listing(store: &MemoryStore, external_id: &str, title: &str) -> Uuid {
        let source = store
            .upsert_job_source(JobSourceUpsert {
                name: "Acme",
                kind: SourceKind::Generic,
                base_url: "https://jobs.acme.example",
                last_scraped_at: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let post = JobPost {
            external_id: external_id.to_string(),
            url: None,
            title: title.to_string(),
            company: "Acme".to_string(),
            location: None,
            raw_description: "A job.".to_string(),
            published_at: None,
        };

        store
            .upsert_job_listing(JobListingUpsert {
                job_source_id: source.id,
                post: &post,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_scores_every_pair_once() {
        let store = MemoryStore::new();
        let user_id = store.add_user(Some("test@example.com"));
        store.add_parsed_cv(user_id, CV_TEXT);
        seed_listing(&store, "job-1", "Frontend Engineer").await;
        seed_listing(&store, "job-2", "Backend Engineer").await;

        let report = match_jobs(&store, &HeuristicScorer, MatchRequest::default())
            .await
            .unwrap();

        assert_eq!(report.created, 2);
        let matches = store.matches();
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.llm_model == HEURISTIC_MODEL));
        assert!(matches.iter().all(|m| (0.0..=1.0).contains(&m.score)));
    }

    #[tokio::test]
    async fn test_second_run_creates_nothing() {
        let store = MemoryStore::new();
        let user_id = store.add_user(Some("test@example.com"));
        store.add_parsed_cv(user_id, CV_TEXT);
        seed_listing(&store, "job-1", "Frontend Engineer").await;

        let first = match_jobs(&store, &HeuristicScorer, MatchRequest::default())
            .await
            .unwrap();
        assert_eq!(first.created, 1);

        let second = match_jobs(&store, &HeuristicScorer, MatchRequest::default())
            .await
            .unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(store.matches().len(), 1);
    }

    #[tokio::test]
    async fn test_user_without_cv_is_skipped() {
        let store = MemoryStore::new();
        store.add_user(Some("no-cv@example.com"));
        seed_listing(&store, "job-1", "Engineer").await;

        let report = match_jobs(&store, &HeuristicScorer, MatchRequest::default())
            .await
            .unwrap();

        assert_eq!(report.created, 0);
        assert!(store.matches().is_empty());
    }

    #[tokio::test]
    async fn test_user_filter_restricts_scope() {
        let store = MemoryStore::new();
        let alice = store.add_user(Some("alice@example.com"));
        store.add_parsed_cv(alice, CV_TEXT);
        let bob = store.add_user(Some("bob@example.com"));
        store.add_parsed_cv(bob, CV_TEXT);
        seed_listing(&store, "job-1", "Engineer").await;

        let report = match_jobs(
            &store,
            &HeuristicScorer,
            MatchRequest {
                user_id: Some(alice),
                job_listing_ids: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(report.created, 1);
        assert!(store.matches().iter().all(|m| m.user_id == alice));
    }

    #[tokio::test]
    async fn test_listing_filter_restricts_scope() {
        let store = MemoryStore::new();
        let user_id = store.add_user(Some("test@example.com"));
        store.add_parsed_cv(user_id, CV_TEXT);
        let wanted = seed_listing(&store, "job-1", "Frontend Engineer").await;
        seed_listing(&store, "job-2", "Backend Engineer").await;

        let report = match_jobs(
            &store,
            &HeuristicScorer,
            MatchRequest {
                user_id: None,
                job_listing_ids: Some(vec![wanted]),
            },
        )
        .await
        .unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(store.matches()[0].job_listing_id, wanted);
    }

    #[tokio::test]
    async fn test_status_follows_review_threshold() {
        let store = MemoryStore::new();
        let user_id = store.add_user(Some("test@example.com"));
        store.add_parsed_cv(user_id, CV_TEXT);
        // Full overlap → 1.0; one of two words → 0.5.
        let strong = seed_listing(&store, "job-1", "Frontend Engineer").await;
        let weak = seed_listing(&store, "job-2", "Backend Engineer").await;

        match_jobs(&store, &HeuristicScorer, MatchRequest::default())
            .await
            .unwrap();

        let matches = store.matches();
        let strong_row = matches.iter().find(|m| m.job_listing_id == strong).unwrap();
        let weak_row = matches.iter().find(|m| m.job_listing_id == weak).unwrap();
        assert_eq!(strong_row.status, MatchScoreStatus::ReadyForReview);
        assert_eq!(weak_row.status, MatchScoreStatus::Pending);
    }

    #[tokio::test]
    async fn test_uses_most_recent_cv() {
        let store = MemoryStore::new();
        let user_id = store.add_user(Some("test@example.com"));
        store.add_parsed_cv(user_id, "Warehouse logistics and forklifts.");
        store.add_parsed_cv_with(user_id, CV_TEXT, json!({}), json!({}));
        seed_listing(&store, "job-1", "Frontend Engineer").await;

        match_jobs(&store, &HeuristicScorer, MatchRequest::default())
            .await
            .unwrap();

        let matches = store.matches();
        assert_eq!(matches.len(), 1);
        // Scored against the newer CV, which covers both title words.
        assert_eq!(matches[0].score, 1.0);
    }
}
