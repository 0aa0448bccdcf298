//! Domain types: the transaction feature record and the prediction verdict.

use serde::{Deserialize, Serialize};

use crate::constants::{PROBABILITY_DECIMALS, PROBABILITY_SCALE};
use crate::schema::FeatureVector;

/// Feature values of a single transaction.
///
/// Field order mirrors [`FEATURE_COLUMNS`](crate::schema::FEATURE_COLUMNS).
/// Values are not range-checked: non-negativity of the first five fields is
/// a property of the data, and `gas_fee_ratio` has no fixed bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionFeatures {
    /// Transferred value in ETH.
    pub tx_value_eth: f64,
    /// Gas price in gwei.
    pub gas_price_gwei: f64,
    /// Time elapsed since the sender's previous transaction.
    pub time_since_last_tx: f64,
    /// Number of transactions sent by the address so far.
    pub num_transactions_per_address: f64,
    /// Age of the sending account in days.
    pub account_age_days: f64,
    /// Gas fee relative to transferred value.
    pub gas_fee_ratio: f64,
}

impl TransactionFeatures {
    /// Assemble the feature vector in schema order.
    pub fn to_vector(&self) -> FeatureVector {
        [
            self.tx_value_eth,
            self.gas_price_gwei,
            self.time_since_last_tx,
            self.num_transactions_per_address,
            self.account_age_days,
            self.gas_fee_ratio,
        ]
    }

    /// Inverse of [`to_vector`](Self::to_vector).
    pub fn from_vector(v: FeatureVector) -> Self {
        Self {
            tx_value_eth: v[0],
            gas_price_gwei: v[1],
            time_since_last_tx: v[2],
            num_transactions_per_address: v[3],
            account_age_days: v[4],
            gas_fee_ratio: v[5],
        }
    }
}

/// Verdict returned for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Whether the classifier labelled the transaction as fraudulent.
    pub is_fraud: bool,
    /// Probability of the fraud class as a percentage, two decimals.
    pub fraud_probability: f64,
}

impl PredictionResult {
    /// Build a verdict from the model's label and positive-class probability.
    pub fn new(label: usize, fraud_class_probability: f64) -> Self {
        Self {
            is_fraud: label != 0,
            fraud_probability: to_percentage(fraud_class_probability),
        }
    }
}

/// Convert a probability in [0, 1] to a percentage rounded to two decimals.
pub fn to_percentage(probability: f64) -> f64 {
    round_decimals(probability * PROBABILITY_SCALE, PROBABILITY_DECIMALS)
}

/// Round to `decimals` places; exact halves go to the even neighbour.
fn round_decimals(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round_ties_even() / factor
}
