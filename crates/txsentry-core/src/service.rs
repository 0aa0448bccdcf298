//! The inference service: validate, assemble, scale, infer, respond.
//!
//! [`InferenceService`] is built once at startup from a scaler and a
//! classifier and then shared read-only by every request. It keeps no other
//! state, so identical inputs always produce identical verdicts.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::artifact::{self, ArtifactPaths};
use crate::error::{ArtifactError, InferenceError, PredictError};
use crate::model::fraud_probability;
use crate::traits::{FeatureScaler, FraudClassifier};
use crate::types::{PredictionResult, TransactionFeatures};
use crate::validation;

/// Shared prediction context holding the fitted artifacts.
#[derive(Clone)]
pub struct InferenceService {
    scaler: Arc<dyn FeatureScaler>,
    model: Arc<dyn FraudClassifier>,
}

impl InferenceService {
    /// Wrap an already-loaded scaler and classifier.
    pub fn new(scaler: Arc<dyn FeatureScaler>, model: Arc<dyn FraudClassifier>) -> Self {
        Self { scaler, model }
    }

    /// Load both artifacts from disk. Any failure is fatal to startup.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let model = artifact::load_model(&paths.model)?;
        let scaler = artifact::load_scaler(&paths.scaler)?;
        Ok(Self::new(Arc::new(scaler), Arc::new(model)))
    }

    /// Predict from a raw request body.
    pub fn predict_body(&self, body: &[u8]) -> Result<PredictionResult, PredictError> {
        let raw = validation::parse_body(body).inspect_err(|e| {
            warn!(error = %e, "Rejected prediction request");
        })?;
        self.predict(&raw)
    }

    /// Predict from an untyped JSON payload.
    pub fn predict(&self, raw: &Value) -> Result<PredictionResult, PredictError> {
        info!(input = %raw, "Received prediction request");

        let features = validation::decode_features(raw).inspect_err(|e| {
            warn!(error = %e, "Rejected prediction request");
        })?;

        let result = self.predict_features(&features).inspect_err(|e| {
            warn!(error = %e, "Prediction failed");
        })?;

        info!(
            is_fraud = result.is_fraud,
            fraud_probability = result.fraud_probability,
            "Prediction result"
        );
        Ok(result)
    }

    /// Score an already-validated feature record.
    pub fn predict_features(
        &self,
        features: &TransactionFeatures,
    ) -> Result<PredictionResult, InferenceError> {
        let scaled = self.scaler.transform(&features.to_vector())?;
        debug!(?scaled, "Scaled features");

        let label = self.model.predict(&scaled)?;
        let proba = self.model.predict_proba(&scaled)?;

        Ok(PredictionResult::new(label, fraud_probability(&proba)))
    }
}
