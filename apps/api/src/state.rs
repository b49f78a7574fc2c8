use std::sync::Arc;

use crate::config::Config;
use crate::matching::scoring::MatchScorer;
use crate::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    /// Pluggable match scorer. LLM-backed when an API key is configured,
    /// heuristic otherwise.
    pub scorer: Arc<dyn MatchScorer>,
    /// Shared HTTP client handed to source adapters; carries the per-fetch
    /// timeout so one frozen source cannot stall a sync run.
    pub http: reqwest::Client,
    pub config: Config,
}
