//! Match scoring — pluggable, trait-based scorer that measures a parsed CV
//! against a job listing.
//!
//! Two tiers: `LlmMatchScorer` (semantic, via the LLM client) and
//! `HeuristicScorer` (keyword overlap, deterministic, no I/O). The heuristic
//! is not a stub: it is the permanent fallback for every LLM failure and the
//! default when no API key is configured.
//!
//! `AppState` holds an `Arc<dyn MatchScorer>`, chosen at startup.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::llm_client::prompts::{MATCH_SCORE_PROMPT_TEMPLATE, MATCH_SCORE_SYSTEM};
use crate::llm_client::{LlmClient, LlmError, MODEL};
use crate::models::job::JobListingRow;
use crate::models::user::{ParsedCvRow, UserRow};

/// Model identifier recorded on heuristic-scored rows. Distinct from any real
/// model name so downstream consumers can tell the two tiers apart.
pub const HEURISTIC_MODEL: &str = "heuristic";

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    /// Always within [0, 1].
    pub score: f64,
    pub explanation: String,
    pub model: String,
}

/// Scores one (user, listing) pair. Infallible by contract: a backend problem
/// downgrades the pair to the heuristic tier instead of aborting the run.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, user: &UserRow, cv: &ParsedCvRow, listing: &JobListingRow)
        -> ScoredMatch;
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicScorer — deterministic keyword overlap
// ────────────────────────────────────────────────────────────────────────────

pub struct HeuristicScorer;

#[async_trait]
impl MatchScorer for HeuristicScorer {
    async fn score(
        &self,
        user: &UserRow,
        cv: &ParsedCvRow,
        listing: &JobListingRow,
    ) -> ScoredMatch {
        heuristic_score(user, cv, listing)
    }
}

/// Keyword-overlap scoring law: the fraction of job-title words that appear
/// as substrings of the combined lowercase CV text (raw text plus serialized
/// skills and profile). 0.0 when the title has no tokens.
pub fn heuristic_score(user: &UserRow, cv: &ParsedCvRow, listing: &JobListingRow) -> ScoredMatch {
    let cv_text = format!(
        "{} {} {}",
        cv.raw_text.as_deref().unwrap_or_default(),
        cv.skills,
        cv.profile
    )
    .to_lowercase();

    let title_words: Vec<String> = listing
        .title
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();

    let hits = title_words
        .iter()
        .filter(|w| cv_text.contains(w.as_str()))
        .count();
    let score = if title_words.is_empty() {
        0.0
    } else {
        hits as f64 / title_words.len() as f64
    };

    let who = user
        .email
        .clone()
        .unwrap_or_else(|| user.id.to_string());

    ScoredMatch {
        score,
        explanation: format!(
            "Heuristic match for {who}: {hits}/{} title keywords found in CV text.",
            title_words.len()
        ),
        model: HEURISTIC_MODEL.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmMatchScorer — semantic scoring with heuristic fallback
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmMatchScorer {
    llm: LlmClient,
}

impl LlmMatchScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    async fn score_with_llm(
        &self,
        cv: &ParsedCvRow,
        listing: &JobListingRow,
    ) -> Result<ScoredMatch, LlmError> {
        let prompt = MATCH_SCORE_PROMPT_TEMPLATE
            .replace("{cv_text}", cv.raw_text.as_deref().unwrap_or_default())
            .replace("{job_title}", &listing.title)
            .replace("{job_description}", &listing.raw_description);

        let parsed: Value = self.llm.call_json(&prompt, MATCH_SCORE_SYSTEM).await?;

        // The raw model output is never trusted: a non-numeric score becomes
        // 0.0 and everything is clamped into [0, 1].
        let score = parsed.get("score").and_then(Value::as_f64).unwrap_or(0.0);
        let explanation = parsed
            .get("explanation")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(ScoredMatch {
            score: clamp_unit(score),
            explanation,
            model: MODEL.to_string(),
        })
    }
}

#[async_trait]
impl MatchScorer for LlmMatchScorer {
    async fn score(
        &self,
        user: &UserRow,
        cv: &ParsedCvRow,
        listing: &JobListingRow,
    ) -> ScoredMatch {
        match self.score_with_llm(cv, listing).await {
            Ok(scored) => scored,
            Err(e) => {
                warn!(
                    "LLM scoring failed for listing {}; falling back to heuristic: {e}",
                    listing.id
                );
                heuristic_score(user, cv, listing)
            }
        }
    }
}

fn clamp_unit(score: f64) -> f64 {
    // max-then-min rather than f64::clamp: NaN collapses to 0.0.
    score.max(0.0).min(1.0)
}
