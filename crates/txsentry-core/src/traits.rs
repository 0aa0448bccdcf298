//! Trait interfaces between the service and its fitted artifacts.
//!
//! - [`FeatureScaler`]: fitted feature transform (scaler artifacts implement)
//! - [`FraudClassifier`]: trained binary classifier (model artifacts implement)
//!
//! Both are shared read-only across request handlers, hence `Send + Sync`.

use crate::constants::FRAUD_CLASS;
use crate::error::InferenceError;

/// Feature transform fitted at training time and replayed at inference time.
pub trait FeatureScaler: Send + Sync {
    /// Number of input features the transform was fitted on.
    fn n_features(&self) -> usize;

    /// Scale one raw feature vector.
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Binary classifier producing a fraud label and class probabilities.
pub trait FraudClassifier: Send + Sync {
    /// Number of input features the model was trained on.
    fn n_features(&self) -> usize;

    /// Class probabilities `[p_legit, p_fraud]` for one scaled feature vector.
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError>;

    /// Predicted class label (0 = legitimate, 1 = fraud).
    ///
    /// Default implementation takes the most probable class, resolving ties
    /// to class 0.
    fn predict(&self, features: &[f64]) -> Result<usize, InferenceError> {
        let proba = self.predict_proba(features)?;
        Ok(if proba[FRAUD_CLASS] > proba[0] { FRAUD_CLASS } else { 0 })
    }
}
