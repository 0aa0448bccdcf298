//! Canonical feature schema.
//!
//! The order of [`FEATURE_COLUMNS`] is the order the scaler and model were
//! fitted with. Request validation, feature-vector assembly, and artifact
//! loading all read it from here.

/// Number of features in a transaction record.
pub const FEATURE_COUNT: usize = 6;

/// Feature column names in fitted order.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "tx_value_eth",
    "gas_price_gwei",
    "time_since_last_tx",
    "num_transactions_per_address",
    "account_age_days",
    "gas_fee_ratio",
];

/// A feature vector in [`FEATURE_COLUMNS`] order.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Position of a column in the schema, if it is one.
pub fn column_index(name: &str) -> Option<usize> {
    FEATURE_COLUMNS.iter().position(|c| *c == name)
}

/// Check that an artifact's declared column list matches the schema exactly.
pub fn matches_schema<S: AsRef<str>>(names: &[S]) -> bool {
    names.len() == FEATURE_COUNT
        && names
            .iter()
            .zip(FEATURE_COLUMNS.iter())
            .all(|(a, b)| a.as_ref() == *b)
}
