mod advisor;
mod capabilities;
mod config;
mod errors;
mod language;
mod pipeline;
mod recommend;
mod routes;
mod speech;
mod state;
mod vision;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::capabilities::CapabilityRegistry;
use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::recommend::knowledge_base;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Compass API v{}", env!("CARGO_PKG_VERSION"));

    for &capability in &config.partial_credentials {
        warn!(
            capability,
            "credentials are only partially configured; treating them as absent"
        );
    }

    // Refuse to serve from a malformed knowledge base
    knowledge_base::validate()?;
    info!(
        "Knowledge base loaded ({} entries)",
        knowledge_base::KNOWLEDGE_BASE.len()
    );

    // Resolve every capability slot once; runs consult the registry after this
    let registry = Arc::new(CapabilityRegistry::from_config(&config));
    let pipeline = Arc::new(Pipeline::new(registry.clone()));

    // Build app state
    let state = AppState {
        registry,
        pipeline,
        config: config.clone(),
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
