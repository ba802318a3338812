mod auth;
mod config;
mod db;
mod errors;
mod knowledge;
mod llm_client;
mod models;
mod proposals;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::connect_store;
use crate::llm_client::GeminiClient;
use crate::proposals::generator::GeminiGenerator;
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

    info!("Starting Proposal Desk API v{}", env!("CARGO_PKG_VERSION"));

    let store = connect_store(&config).await?;

    let generator = Arc::new(GeminiGenerator(GeminiClient::new()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not set; requests must supply their own api_key");
    }

    let state = AppState::new(store, generator, config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
