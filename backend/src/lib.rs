//! Flood Risk Gateway - backend library
//!
//! Fuses a gridded hourly forecast with a regional categorical forecast and
//! classifies flood risk through an external inference service.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};

use crate::external::FloodModelClient;
use crate::services::{PredictionDispatcher, WeatherGateway};
use crate::store::DocumentStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
    pub weather: WeatherGateway,
    pub predictor: PredictionDispatcher,
}

impl AppState {
    /// Wire the services from configuration around the given store
    pub fn from_config(config: Config, store: Arc<dyn DocumentStore>) -> AppResult<Self> {
        let weather = WeatherGateway::from_config(&config, Arc::clone(&store))?;
        let model = FloodModelClient::new(
            config.inference.endpoint.clone(),
            config.inference.timeout(),
        )?;
        let predictor = PredictionDispatcher::new(model, Arc::clone(&store));

        Ok(Self {
            config: Arc::new(config),
            store,
            weather,
            predictor,
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Flood Risk Gateway API v0.1"
}
