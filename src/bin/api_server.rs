// API Server Binary Entry Point
//
// Purpose: Start the Axum recommendation server
// Usage: cargo run --features api --bin api_server

use crop_recommender::{create_router, AppState, ServerConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "crop_recommender=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    let config = ServerConfig::from_env();

    tracing::info!("Configuration:");
    tracing::info!("  CROP_CATALOG: {}", config.catalog_path.display());
    match &config.questionnaire_path {
        Some(path) => tracing::info!("  QUESTIONNAIRE: {}", path.display()),
        None => tracing::info!("  QUESTIONNAIRE: (built-in)"),
    }
    tracing::info!("  PORT: {}", config.port);
    tracing::info!("  CACHE_TTL_SECS: {}", config.cache_ttl.as_secs());

    // Loads catalog, computes AHP weights
    tracing::info!("Initializing application state...");
    let state = AppState::new(&config)?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
