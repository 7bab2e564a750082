use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::interview::source::QuestionSource;
use crate::interview::store::SessionStore;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// `None` when no API key is configured; résumé parsing is then skipped
    /// and the question source is rule-based.
    pub llm: Option<LlmClient>,
    pub config: Config,
    /// Active question source, selected once at startup.
    pub questions: Arc<dyn QuestionSource>,
    /// Session repository. Default: in-memory, one mutex per session.
    pub sessions: Arc<dyn SessionStore>,
}
