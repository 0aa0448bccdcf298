//! Loading fitted artifacts from disk.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::info;

use crate::constants::{DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use crate::error::ArtifactError;
use crate::model::ModelArtifact;
use crate::scaler::ScalerArtifact;

/// Filesystem locations of the model and scaler artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL_PATH),
            scaler: PathBuf::from(DEFAULT_SCALER_PATH),
        }
    }
}

/// Read and validate a scaler artifact.
pub fn load_scaler(path: impl AsRef<Path>) -> Result<ScalerArtifact, ArtifactError> {
    let path = path.as_ref();
    let scaler: ScalerArtifact = read_json("scaler", path)?;
    scaler.validate()?;
    info!(path = %path.display(), "Scaler loaded");
    Ok(scaler)
}

/// Read and validate a model artifact.
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelArtifact, ArtifactError> {
    let path = path.as_ref();
    let model: ModelArtifact = read_json("model", path)?;
    model.validate()?;
    info!(path = %path.display(), kind = model.kind(), "Model loaded");
    Ok(model)
}

fn read_json<T: DeserializeOwned>(artifact: &'static str, path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        artifact,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        artifact,
        path: path.to_path_buf(),
        source,
    })
}
