//! Error types for txsentry.
use std::path::PathBuf;

use thiserror::Error;

/// Failure to load a scaler or model artifact. Fatal at startup.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("cannot read {artifact} artifact at {}: {source}", path.display())]
    Io { artifact: &'static str, path: PathBuf, source: std::io::Error },
    #[error("malformed {artifact} artifact at {}: {source}", path.display())]
    Parse { artifact: &'static str, path: PathBuf, source: serde_json::Error },
    #[error("{artifact} artifact was fitted on columns {found:?}, expected the canonical schema")]
    SchemaMismatch { artifact: &'static str, found: Vec<String> },
    #[error("{artifact} artifact `{field}` has {got} entries, expected {expected}")]
    DimensionMismatch { artifact: &'static str, field: &'static str, expected: usize, got: usize },
    #[error("invalid {artifact} artifact: {reason}")]
    InvalidParameter { artifact: &'static str, reason: String },
}

/// Request payload rejected before inference. Reported as a client error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))] MissingFields(Vec<String>),
    #[error("invalid data type for {field}: {reason}")] InvalidType { field: String, reason: String },
}

/// Failure while scaling or scoring a validated feature vector. Reported as a server error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("{stage} expected {expected} features, got {got}")] DimensionMismatch { stage: &'static str, expected: usize, got: usize },
    #[error("{stage} produced a non-finite value")] NonFinite { stage: &'static str },
    #[error("class probability out of range: {0}")] InvalidProbability(f64),
    #[error("{0}")] Backend(String),
}

/// Any failure of a single prediction request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error(transparent)] Validation(#[from] ValidationError),
    #[error(transparent)] Inference(#[from] InferenceError),
    /// Body that is not JSON. Reported as a server error.
    #[error("malformed request body: {0}")] MalformedBody(String),
}

impl PredictError {
    /// Whether the caller is at fault (bad payload) rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
