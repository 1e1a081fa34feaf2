//! Multi Purpose GenAI Assistant HTTP Server
//!
//! Axum-based server exposing session and question endpoints, and serving
//! the WASM front-end.

mod config;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assistant_core::{MemorySessionStore, ProviderConnector};
use assistant_runtime::GroqConnector;
use assistant_tools::{
    encyclopedia::{EncyclopediaClient, WikipediaClient},
    AssistantSettings,
};

use crate::config::ServerConfig;
use crate::handlers::{ask, create_session, delete_session, get_session, health_check};
use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))

        // Sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/ask", post(ask))

        // Static files (WASM frontend)
        .fallback_service(ServeDir::new(static_dir))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Drop idle sessions on a fixed interval
fn spawn_session_sweeper(sessions: Arc<MemorySessionStore>, config: &ServerConfig) -> anyhow::Result<()> {
    let ttl = chrono::Duration::from_std(config.session_ttl)?;
    let mut interval = tokio::time::interval(config.sweep_interval);

    tokio::spawn(async move {
        loop {
            interval.tick().await;
            let removed = sessions.prune_idle(ttl);
            if removed > 0 {
                tracing::info!(removed, remaining = sessions.len(), "Swept idle sessions");
            }
        }
    });

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env();

    // The key arrives with each question; only the endpoint is configured here
    let connector = GroqConnector::from_env();
    tracing::info!("LLM provider: {} ({})", connector.name(), connector.model());

    let encyclopedia: Arc<dyn EncyclopediaClient> = Arc::new(WikipediaClient::from_env()?);
    if encyclopedia.health_check().await {
        tracing::info!("✓ Connected to {}", encyclopedia.name());
    } else {
        tracing::warn!("⚠ {} not reachable - lookups will fail", encyclopedia.name());
    }

    let settings = AssistantSettings::from_env(connector.model());
    tracing::info!(
        max_iterations = settings.max_iterations,
        verbose = settings.verbose,
        "Agent configured"
    );

    let sessions = Arc::new(MemorySessionStore::new());
    spawn_session_sweeper(sessions.clone(), &config)?;

    let state = AppState {
        connector: Arc::new(connector),
        encyclopedia,
        sessions,
        settings,
    };

    let app = router(state, &config.static_dir);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 GenAI assistant running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health                 - Health check");
    tracing::info!("  POST   /api/sessions           - Start a session");
    tracing::info!("  GET    /api/sessions/{{id}}      - Session transcript");
    tracing::info!("  DELETE /api/sessions/{{id}}      - End a session");
    tracing::info!("  POST   /api/sessions/{{id}}/ask  - Ask a question");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
