//! Route definitions for the Flood Risk Gateway

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/weather", weather_routes())
        .nest("/predict", predict_routes())
}

/// Unified weather and history
fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/openweather", get(handlers::get_unified_weather))
        .route("/current", get(handlers::get_current_status))
        .route("/history", get(handlers::get_weather_history))
}

/// Flood risk classification
fn predict_routes() -> Router<AppState> {
    Router::new()
        .route("/run", post(handlers::run_prediction))
        .route("/now", post(handlers::predict_now))
}
