mod config;
mod db;
mod errors;
mod jobs;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::matching::scoring::{HeuristicScorer, LlmMatchScorer, MatchScorer, HEURISTIC_MODEL};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;
use crate::store::JobStore;

/// Per-fetch timeout toward external job boards.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobhound API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and apply migrations
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;

    let store: Arc<dyn JobStore> = Arc::new(PgStore::new(pool));

    // Pick the scoring tier: LLM with heuristic fallback when a key is
    // configured, heuristic alone otherwise.
    let scorer: Arc<dyn MatchScorer> = match &config.anthropic_api_key {
        Some(key) => {
            info!("Match scorer initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmMatchScorer::new(LlmClient::new(key.clone())))
        }
        None => {
            info!("No API key configured; match scorer initialized ({HEURISTIC_MODEL})");
            Arc::new(HeuristicScorer)
        }
    };

    // Shared HTTP client for all source adapters
    let http = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;

    let state = AppState {
        store,
        scorer,
        http,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
