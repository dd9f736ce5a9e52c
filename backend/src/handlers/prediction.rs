//! HTTP handlers for flood risk prediction

use axum::{extract::State, Json};
use serde::Deserialize;
use shared::{validate_feature_vector, FeatureVector, RiskClassification};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// One observation as posted by clients. Missing fields take neutral values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureStepInput {
    pub rainfall: Option<f64>,
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

impl FeatureStepInput {
    pub fn to_features(&self) -> FeatureVector {
        FeatureVector {
            rainfall: self.rainfall.unwrap_or(0.0),
            temperature: self.temp.unwrap_or(30.0),
            humidity: self.humidity.unwrap_or(80.0),
            pressure: self.pressure.unwrap_or(1010.0),
        }
    }
}

/// Batch of sequences; only the first sequence is classified
#[derive(Debug, Deserialize)]
pub struct PredictRunRequest {
    #[serde(default)]
    pub features: Vec<Vec<FeatureStepInput>>,
}

impl PredictRunRequest {
    /// Observations of the first sequence, validated
    pub fn observations(&self) -> AppResult<Vec<FeatureVector>> {
        let steps = self
            .features
            .first()
            .filter(|steps| !steps.is_empty())
            .ok_or_else(|| AppError::InsufficientInput("no observations supplied".to_string()))?;

        steps
            .iter()
            .enumerate()
            .map(|(i, step)| -> AppResult<FeatureVector> {
                let features = step.to_features();
                validate_feature_vector(&features)
                    .map_err(|e| AppError::validation(&format!("features[0][{}]", i), e))?;
                Ok(features)
            })
            .collect()
    }
}

/// Classify a posted observation sequence
pub async fn run_prediction(
    State(state): State<AppState>,
    Json(request): Json<PredictRunRequest>,
) -> AppResult<Json<RiskClassification>> {
    let observations = request.observations()?;
    let classification = state.predictor.classify(&observations).await?;
    Ok(Json(classification))
}

/// Classify the most recent stored observations
pub async fn predict_now(State(state): State<AppState>) -> AppResult<Json<RiskClassification>> {
    let classification = state.predictor.predict_from_history().await?;
    Ok(Json(classification))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let request: PredictRunRequest =
            serde_json::from_str(r#"{"features": [[{"rainfall": 12.5}]]}"#).unwrap();
        let observations = request.observations().unwrap();
        assert_eq!(
            observations,
            vec![FeatureVector {
                rainfall: 12.5,
                temperature: 30.0,
                humidity: 80.0,
                pressure: 1010.0,
            }]
        );
    }

    #[test]
    fn test_empty_sequence_is_insufficient() {
        for body in [r#"{"features": []}"#, r#"{"features": [[]]}"#, "{}"] {
            let request: PredictRunRequest = serde_json::from_str(body).unwrap();
            assert!(matches!(
                request.observations(),
                Err(AppError::InsufficientInput(_))
            ));
        }
    }

    #[test]
    fn test_negative_rainfall_is_rejected() {
        let request: PredictRunRequest =
            serde_json::from_str(r#"{"features": [[{"rainfall": 1.0}, {"rainfall": -3.0}]]}"#)
                .unwrap();
        match request.observations() {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "features[0][1]"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
