//! Flood Risk Gateway - Backend Server
//!
//! Serves fused hourly rain forecasts and flood risk classifications for
//! Indonesian urban areas.

use std::net::SocketAddr;

use flood_risk_backend::{create_app, store::create_store, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "flood_risk_server=debug,flood_risk_backend=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Flood Risk Gateway");
    tracing::info!("Environment: {}", config.environment);

    if config.openweather.api_key.trim().is_empty() {
        tracing::warn!("No OpenWeatherMap API key configured; unified weather will be degraded");
    }

    let store = create_store(config.store.backend);
    tracing::info!("History store: {}", store.backend_name());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Create application state
    let state = AppState::from_config(config, store)?;

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
