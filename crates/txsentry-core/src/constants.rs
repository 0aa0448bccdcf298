//! Service constants and defaults.

/// Body of the liveness response served at `GET /`.
pub const LIVENESS_MESSAGE: &str = "Fraud Detection API is running!";

/// Default HTTP bind address for the server.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Default path of the model artifact, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "artifacts/fraud_model.json";

/// Default path of the scaler artifact, relative to the working directory.
pub const DEFAULT_SCALER_PATH: &str = "artifacts/scaler.json";

/// Probabilities are reported as percentages.
pub const PROBABILITY_SCALE: f64 = 100.0;

/// Decimal places kept in the reported fraud probability.
pub const PROBABILITY_DECIMALS: i32 = 2;

/// Label of the positive (fraud) class.
pub const FRAUD_CLASS: usize = 1;
