use crate::config::Config;
use crate::review::orchestrator::ReviewOrchestrator;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Runs extraction and both model stages. Holds the model client and prompt templates.
    pub orchestrator: ReviewOrchestrator,
    pub sessions: SessionStore,
    pub config: Config,
}
