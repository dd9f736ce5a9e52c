//! Shared fixtures for the integration tests

#![allow(dead_code)]

use flood_risk_backend::config::{
    BmkgConfig, Config, ForecastConfig, InferenceConfig, OpenWeatherConfig, ServerConfig,
    StoreBackend, StoreConfig,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const JAKARTA: (f64, f64) = (-6.2088, 106.8456);

/// Configuration with every upstream pointed at `server`
pub fn test_config(server: &MockServer) -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        openweather: OpenWeatherConfig {
            base_url: server.uri(),
            api_key: "test-key".to_string(),
            timeout_secs: 5,
        },
        bmkg: BmkgConfig {
            base_url: server.uri(),
            region_code: "31".to_string(),
            timeout_secs: 5,
        },
        inference: InferenceConfig {
            endpoint: format!("{}/predict", server.uri()),
            timeout_secs: 5,
        },
        forecast: ForecastConfig::default(),
        store: StoreConfig {
            backend: StoreBackend::Memory,
        },
    }
}

pub fn current_weather_body() -> Value {
    json!({
        "name": "Jakarta",
        "main": { "temp": 31.2, "humidity": 74, "pressure": 1008 },
        "wind": { "speed": 3.1 },
        "rain": { "1h": 0.4 }
    })
}

/// Ten 3-hourly steps; the first carries pop 0.3
pub fn forecast_body() -> Value {
    let list: Vec<Value> = (0..10)
        .map(|i| {
            json!({
                "dt": 1_760_600_000_i64 + i * 10_800,
                "main": { "temp": 29.0 + i as f64 * 0.1, "humidity": 80, "pressure": 1009 },
                "wind": { "speed": 2.0 },
                "pop": if i == 0 { 0.3 } else { 0.0 },
                "rain": { "3h": 1.5 }
            })
        })
        .collect();

    json!({ "city": { "name": "Jakarta" }, "list": list })
}

/// Two Jakarta areas; the one nearest the default point has `nearest_desc`
pub fn regional_body(nearest_desc: &str) -> Value {
    json!({
        "data": [
            {
                "lokasi": { "kotakab": "Jakarta Utara", "lat": "-6.1214", "lon": "106.7741" },
                "cuaca": [[{ "weather_desc": "Cerah", "local_datetime": "2026-10-16 07:00:00" }]]
            },
            {
                "lat": -6.2000, "lon": 106.8400,
                "lokasi": { "kotakab": "Jakarta Pusat" },
                "cuaca": [[{ "weather_desc": nearest_desc }, { "weather_desc": "Cerah" }]]
            }
        ]
    })
}

pub async fn mount_json(server: &MockServer, route: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Healthy responses from both weather providers
pub async fn mount_weather_providers(server: &MockServer, nearest_desc: &str) {
    mount_json(server, "/weather", 200, current_weather_body()).await;
    mount_json(server, "/forecast", 200, forecast_body()).await;
    mount_json(server, "/publik/prakiraan-cuaca", 200, regional_body(nearest_desc)).await;
}

/// Give fire-and-forget writes a chance to land
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
}
