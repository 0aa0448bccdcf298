//! Shared test helpers for E2E and adversarial tests.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use txsentry_core::schema::FEATURE_COLUMNS;
use txsentry_core::{ArtifactPaths, InferenceService};

/// Paths of the demo artifacts shipped in the repository's `artifacts/`.
pub fn demo_artifacts() -> ArtifactPaths {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../artifacts");
    ArtifactPaths {
        model: root.join("fraud_model.json"),
        scaler: root.join("scaler.json"),
    }
}

/// Service backed by the demo artifacts.
pub fn demo_service() -> InferenceService {
    InferenceService::load(&demo_artifacts()).unwrap()
}

/// The reference request used throughout the API docs.
pub fn scenario() -> Value {
    json!({
        "tx_value_eth": 0.1,
        "gas_price_gwei": 5,
        "time_since_last_tx": 12,
        "num_transactions_per_address": 20,
        "account_age_days": 365,
        "gas_fee_ratio": 0.02
    })
}

/// A request the demo model flags: large value, young account, rapid resend.
pub fn high_risk() -> Value {
    json!({
        "tx_value_eth": 2.0,
        "gas_price_gwei": 40,
        "time_since_last_tx": 1,
        "num_transactions_per_address": 3,
        "account_age_days": 10,
        "gas_fee_ratio": 0.9
    })
}

/// Standard scaler JSON with schema column names.
pub fn standard_scaler_json(mean: [f64; 6], scale: [f64; 6]) -> Value {
    json!({
        "kind": "standard",
        "feature_names": FEATURE_COLUMNS,
        "mean": mean,
        "scale": scale,
    })
}

/// Logistic regression JSON with schema column names.
pub fn logistic_json(coefficients: [f64; 6], intercept: f64) -> Value {
    json!({
        "kind": "logistic_regression",
        "feature_names": FEATURE_COLUMNS,
        "coefficients": coefficients,
        "intercept": intercept,
    })
}

/// Write a scaler/model pair into `dir` and return their paths.
pub fn write_artifacts(dir: &Path, scaler: &Value, model: &Value) -> ArtifactPaths {
    let paths = ArtifactPaths {
        model: dir.join("fraud_model.json"),
        scaler: dir.join("scaler.json"),
    };
    std::fs::write(&paths.scaler, serde_json::to_vec_pretty(scaler).unwrap()).unwrap();
    std::fs::write(&paths.model, serde_json::to_vec_pretty(model).unwrap()).unwrap();
    paths
}
