//! Fitted feature scalers.
//!
//! Scaler artifacts are JSON documents tagged by `kind`:
//!
//! ```json
//! {"kind": "standard", "feature_names": [...], "mean": [...], "scale": [...]}
//! {"kind": "min_max", "data_min": [...], "data_max": [...]}
//! ```
//!
//! `feature_names` is optional; when present it must equal the schema.

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, InferenceError};
use crate::schema::{self, FEATURE_COUNT};
use crate::traits::FeatureScaler;

const ARTIFACT: &str = "scaler";

/// Standardizes each column to zero mean and unit variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    /// Per-column mean observed at fit time.
    pub mean: Vec<f64>,
    /// Per-column standard deviation observed at fit time.
    pub scale: Vec<f64>,
}

/// Maps each column linearly onto [0, 1] using the fitted range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
}

/// Any supported scaler artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl ScalerArtifact {
    /// Check the artifact against the schema before it is put into service.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        match self {
            Self::Standard(s) => {
                check_names(s.feature_names.as_deref())?;
                check_params("mean", &s.mean)?;
                check_params("scale", &s.scale)?;
                if s.scale.iter().any(|v| *v < 0.0) {
                    return Err(invalid("scale must be non-negative".into()));
                }
            }
            Self::MinMax(s) => {
                check_names(s.feature_names.as_deref())?;
                check_params("data_min", &s.data_min)?;
                check_params("data_max", &s.data_max)?;
                if let Some(i) = (0..FEATURE_COUNT).find(|&i| s.data_min[i] > s.data_max[i]) {
                    return Err(invalid(format!(
                        "data_min exceeds data_max for column {}",
                        schema::FEATURE_COLUMNS[i]
                    )));
                }
            }
        }
        Ok(())
    }
}

impl FeatureScaler for ScalerArtifact {
    fn n_features(&self) -> usize {
        match self {
            Self::Standard(s) => s.mean.len(),
            Self::MinMax(s) => s.data_min.len(),
        }
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let expected = self.n_features();
        if features.len() != expected {
            return Err(InferenceError::DimensionMismatch {
                stage: ARTIFACT,
                expected,
                got: features.len(),
            });
        }

        let scaled: Vec<f64> = match self {
            Self::Standard(s) => features
                .iter()
                .zip(s.mean.iter().zip(&s.scale))
                .map(|(x, (mean, scale))| (x - mean) / nonzero(*scale))
                .collect(),
            Self::MinMax(s) => features
                .iter()
                .zip(s.data_min.iter().zip(&s.data_max))
                .map(|(x, (lo, hi))| (x - lo) / nonzero(hi - lo))
                .collect(),
        };

        if scaled.iter().all(|v| v.is_finite()) {
            Ok(scaled)
        } else {
            Err(InferenceError::NonFinite { stage: ARTIFACT })
        }
    }
}

// Constant columns are fitted with zero spread; divide by one instead.
fn nonzero(v: f64) -> f64 {
    if v == 0.0 { 1.0 } else { v }
}

pub(crate) fn check_names_for(
    artifact: &'static str,
    names: Option<&[String]>,
) -> Result<(), ArtifactError> {
    match names {
        Some(names) if !schema::matches_schema(names) => Err(ArtifactError::SchemaMismatch {
            artifact,
            found: names.to_vec(),
        }),
        _ => Ok(()),
    }
}

pub(crate) fn check_params_for(
    artifact: &'static str,
    field: &'static str,
    values: &[f64],
) -> Result<(), ArtifactError> {
    if values.len() != FEATURE_COUNT {
        return Err(ArtifactError::DimensionMismatch {
            artifact,
            field,
            expected: FEATURE_COUNT,
            got: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ArtifactError::InvalidParameter {
            artifact,
            reason: format!("`{field}` contains a non-finite value"),
        });
    }
    Ok(())
}

fn check_names(names: Option<&[String]>) -> Result<(), ArtifactError> {
    check_names_for(ARTIFACT, names)
}

fn check_params(field: &'static str, values: &[f64]) -> Result<(), ArtifactError> {
    check_params_for(ARTIFACT, field, values)
}

fn invalid(reason: String) -> ArtifactError {
    ArtifactError::InvalidParameter { artifact: ARTIFACT, reason }
}
