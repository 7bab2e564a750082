mod config;
mod db;
mod errors;
mod intake;
mod interview;
mod jobs;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::interview::source::{LlmQuestionSource, QuestionSource, RuleBasedQuestionSource};
use crate::interview::store::InMemorySessionStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client and pick the question source. A missing API key
    // degrades to the rule-based generator instead of aborting.
    let llm = match &config.anthropic_api_key {
        Some(key) => Some(LlmClient::new(key.clone())?),
        None => None,
    };
    let questions: Arc<dyn QuestionSource> = match &llm {
        Some(client) => {
            info!("LLM question source initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmQuestionSource::new(client.clone()))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; using rule-based question generator");
            Arc::new(RuleBasedQuestionSource)
        }
    };

    // Build app state
    let state = AppState {
        db,
        llm,
        config: config.clone(),
        questions,
        sessions: Arc::new(InMemorySessionStore::default()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
