//! Server configuration loaded from environment variables.

use std::path::PathBuf;

use txsentry_core::ArtifactPaths;
use txsentry_core::constants::DEFAULT_BIND_ADDR;

#[derive(Clone, Debug)]
pub struct Config {
    /// Address to bind the HTTP server.
    pub bind_addr: String,
    /// Model and scaler artifact locations.
    pub artifacts: ArtifactPaths,
    /// Log level filter string, used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log output format: "text" or "json".
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            artifacts: ArtifactPaths::default(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `TXSENTRY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup("TXSENTRY_BIND_ADDR").unwrap_or(defaults.bind_addr),
            artifacts: ArtifactPaths {
                model: lookup("TXSENTRY_MODEL_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.artifacts.model),
                scaler: lookup("TXSENTRY_SCALER_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.artifacts.scaler),
            },
            log_level: lookup("TXSENTRY_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: lookup("TXSENTRY_LOG_FORMAT").unwrap_or(defaults.log_format),
        }
    }
}
