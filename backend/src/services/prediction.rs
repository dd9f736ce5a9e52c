//! Prediction dispatcher
//!
//! Shapes observations into a fixed-length window, asks the inference
//! service for a classification and falls back to a rainfall heuristic when
//! the service cannot answer.

use std::sync::Arc;

use chrono::Utc;
use shared::{
    FeatureVector, FeatureWindow, PredictionRecord, RiskClassification, WeatherRecord,
    PREDICTIONS_COLLECTION, SEQUENCE_LENGTH, TIMESTAMP_FIELD, WEATHER_HISTORY_COLLECTION,
};

use crate::error::{AppError, AppResult};
use crate::external::FloodModelClient;
use crate::store::{append_record, query_records, DocumentStore, OrderBy};

#[derive(Clone)]
pub struct PredictionDispatcher {
    model: FloodModelClient,
    store: Arc<dyn DocumentStore>,
}

impl PredictionDispatcher {
    pub fn new(model: FloodModelClient, store: Arc<dyn DocumentStore>) -> Self {
        Self { model, store }
    }

    /// Classify a sequence of observations, oldest first.
    ///
    /// Fails only when there is nothing to classify. The result is recorded
    /// in the background.
    pub async fn classify(&self, observations: &[FeatureVector]) -> AppResult<RiskClassification> {
        let window = FeatureWindow::from_observations(observations)
            .map_err(|e| AppError::InsufficientInput(e.to_string()))?;

        if observations.len() != SEQUENCE_LENGTH {
            tracing::debug!(
                received = observations.len(),
                expected = SEQUENCE_LENGTH,
                "Reshaped observations into a fixed window"
            );
        }

        let classification = self.classify_window(&window).await;
        self.spawn_prediction_write(&window, &classification);
        Ok(classification)
    }

    /// Model classification for `window`, or the heuristic if the model fails
    pub async fn classify_window(&self, window: &FeatureWindow) -> RiskClassification {
        let outcome = match self.model.predict(window).await {
            Ok(response) => response.into_classification(),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(classification) => {
                tracing::info!(
                    category = %classification.category,
                    probability = classification.probability,
                    "Flood risk classified"
                );
                classification
            }
            Err(e) => {
                let fallback = RiskClassification::fallback(window);
                tracing::warn!(
                    error = %e,
                    rainfall_mm = window.total_rainfall(),
                    category = %fallback.category,
                    "Inference unavailable, using rainfall heuristic"
                );
                fallback
            }
        }
    }

    /// Classify the most recent stored observations
    pub async fn predict_from_history(&self) -> AppResult<RiskClassification> {
        let mut records: Vec<WeatherRecord> = query_records(
            self.store.as_ref(),
            WEATHER_HISTORY_COLLECTION,
            &OrderBy::desc(TIMESTAMP_FIELD),
            SEQUENCE_LENGTH,
        )
        .await?;

        if records.len() < SEQUENCE_LENGTH {
            return Err(AppError::InsufficientInput(format!(
                "need {} stored observations, found {}",
                SEQUENCE_LENGTH,
                records.len()
            )));
        }

        // Stored newest first; the model expects oldest first
        records.reverse();
        let observations: Vec<FeatureVector> =
            records.iter().map(WeatherRecord::to_features).collect();

        self.classify(&observations).await
    }

    fn spawn_prediction_write(&self, window: &FeatureWindow, classification: &RiskClassification) {
        let record = PredictionRecord::new(window.to_rows(), classification, Utc::now());
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            if let Err(e) = append_record(store.as_ref(), PREDICTIONS_COLLECTION, &record).await {
                tracing::warn!(error = %e, "Failed to record prediction");
            }
        });
    }
}
