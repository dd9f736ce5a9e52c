//! Flood Model Client
//!
//! Client for the LSTM flood-risk inference microservice. The service takes a
//! batch of one window shaped `(1, 5, 4)` and answers with either
//! `{category, probability}` or, on older deployments, `{result, status}`.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{validate_percentage, FeatureWindow, RiskClassification};

use crate::error::{AppError, AppResult};

const SERVICE: &str = "inference";

/// Client for the flood inference microservice
#[derive(Clone)]
pub struct FloodModelClient {
    endpoint: String,
    http_client: Client,
}

/// Request body: a batch with a single window
#[derive(Debug, Serialize)]
pub struct PredictRequest {
    pub features: Vec<Vec<[f64; 4]>>,
}

impl PredictRequest {
    pub fn from_window(window: &FeatureWindow) -> Self {
        Self {
            features: vec![window.to_rows()],
        }
    }
}

/// Response from the predict endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PredictResponse {
    /// `probability` on the 0-100 scale
    Category { category: String, probability: f64 },
    /// `result` is a 0-1 risk score, `status` the category label
    Score { result: f64, status: String },
}

impl PredictResponse {
    /// Interpret the response as a classification, rejecting values that
    /// cannot be a probability
    pub fn into_classification(self) -> AppResult<RiskClassification> {
        let (category, probability) = match self {
            PredictResponse::Category {
                category,
                probability,
            } => (category, probability),
            PredictResponse::Score { result, status } => {
                (status, (result * 10_000.0).round() / 100.0)
            }
        };

        validate_percentage(probability)
            .map_err(|e| AppError::malformed(SERVICE, format!("{}: {}", e, probability)))?;
        if category.trim().is_empty() {
            return Err(AppError::malformed(SERVICE, "empty category"));
        }

        Ok(RiskClassification::from_model(category, probability))
    }
}

impl FloodModelClient {
    /// Create a new flood model client
    pub fn new(endpoint: String, timeout: Duration) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("inference HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            http_client,
        })
    }

    /// Send one window for inference. A single attempt; no retries.
    pub async fn predict(&self, window: &FeatureWindow) -> AppResult<PredictResponse> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&PredictRequest::from_window(window))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::upstream(SERVICE, "request timed out")
                } else {
                    AppError::upstream(SERVICE, format!("request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::upstream(
                SERVICE,
                format!("API returned {}: {}", status, body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::malformed(SERVICE, format!("failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::FeatureVector;

    #[test]
    fn test_request_shape() {
        let window = FeatureWindow::from_observations(&[FeatureVector {
            rainfall: 1.0,
            temperature: 30.0,
            humidity: 80.0,
            pressure: 1010.0,
        }])
        .unwrap();

        let json = serde_json::to_value(PredictRequest::from_window(&window)).unwrap();
        let batch = json["features"].as_array().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].as_array().unwrap().len(), 5);
        assert_eq!(batch[0][4], serde_json::json!([1.0, 30.0, 80.0, 1010.0]));
    }

    #[test]
    fn test_parse_category_shape() {
        let response: PredictResponse =
            serde_json::from_str(r#"{"category": "Siaga", "probability": 55.12}"#).unwrap();
        let classification = response.into_classification().unwrap();
        assert_eq!(classification.result_flag, 1);
        assert_eq!(classification.category, "Siaga");
        assert_eq!(classification.probability, 55.12);
    }

    #[test]
    fn test_parse_score_shape() {
        let response: PredictResponse =
            serde_json::from_str(r#"{"result": 0.85, "status": "Awas"}"#).unwrap();
        let classification = response.into_classification().unwrap();
        assert_eq!(classification.result_flag, 1);
        assert_eq!(classification.category, "Awas");
        assert_eq!(classification.probability, 85.0);
    }

    #[test]
    fn test_safe_category_clears_flag() {
        let response = PredictResponse::Category {
            category: "Aman".to_string(),
            probability: 12.0,
        };
        assert_eq!(response.into_classification().unwrap().result_flag, 0);
    }

    #[test]
    fn test_out_of_range_probability_is_malformed() {
        let response = PredictResponse::Category {
            category: "Awas".to_string(),
            probability: 140.0,
        };
        assert!(response.into_classification().unwrap_err().is_upstream());
    }

    #[test]
    fn test_error_body_does_not_parse() {
        let parsed = serde_json::from_str::<PredictResponse>(r#"{"error": "Model not loaded"}"#);
        assert!(parsed.is_err());
    }
}
