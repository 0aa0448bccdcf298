//! # txsentry-core
//! Feature schema, artifact formats, and the inference service for txsentry.
//!
//! - [`schema`]: the canonical feature column order shared by every stage
//! - [`validation`]: strict decoding of request payloads
//! - [`scaler`] / [`model`]: fitted artifacts behind the [`traits`] seams
//! - [`service::InferenceService`]: validate, scale, infer, respond

pub mod artifact;
pub mod constants;
pub mod error;
pub mod model;
pub mod scaler;
pub mod schema;
pub mod service;
pub mod traits;
pub mod types;
pub mod validation;

pub use artifact::ArtifactPaths;
pub use error::{ArtifactError, InferenceError, PredictError, ValidationError};
pub use service::InferenceService;
pub use types::{PredictionResult, TransactionFeatures};
