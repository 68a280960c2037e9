mod config;
mod errors;
mod extraction;
mod llm_client;
mod render;
mod review;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::DocumentExtractor;
use crate::llm_client::WorkerClient;
use crate::review::orchestrator::ReviewOrchestrator;
use crate::review::prompts::PromptTemplates;
use crate::routes::build_router;
use crate::session::store::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeAI API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize model client
    let model = WorkerClient::new(
        config.model_endpoint_url.clone(),
        config.model_api_key.clone(),
    )?;
    info!("Model client initialized (endpoint: {})", model.endpoint());

    // Prompt templates: built-ins, optionally overridden from PROMPT_DIR
    let templates = match &config.prompt_dir {
        Some(dir) => PromptTemplates::load(dir)?,
        None => PromptTemplates::default(),
    };

    let orchestrator = ReviewOrchestrator::new(
        Arc::new(model),
        Arc::new(DocumentExtractor),
        Arc::new(templates),
    );

    // Build app state
    let state = AppState {
        orchestrator,
        sessions: SessionStore::new(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
