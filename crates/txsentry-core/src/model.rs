//! Trained classifier artifacts.
//!
//! Model artifacts are JSON documents tagged by `kind`:
//!
//! - `logistic_regression`: `coefficients`, `intercept`
//! - `random_forest`: `trees`, each a flat node array rooted at index 0.
//!   A split node sends `x[feature] <= threshold` to `left`, everything else
//!   to `right`; a leaf carries `probabilities: [p_legit, p_fraud]`.
//!
//! Forest probabilities are the mean of the leaf probabilities reached in
//! every tree.

use serde::{Deserialize, Serialize};

use crate::constants::FRAUD_CLASS;
use crate::error::{ArtifactError, InferenceError};
use crate::scaler::{check_names_for, check_params_for};
use crate::schema::FEATURE_COUNT;
use crate::traits::FraudClassifier;

const ARTIFACT: &str = "model";

/// Leaf probabilities must sum to one within this tolerance.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Linear model with a logistic link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Node of a fitted decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    Leaf { probabilities: [f64; 2] },
}

/// A single decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// Bagged ensemble of decision trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub trees: Vec<DecisionTree>,
}

/// Any supported model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl ModelArtifact {
    /// Short name of the model family, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "logistic_regression",
            Self::RandomForest(_) => "random_forest",
        }
    }

    /// Check the artifact against the schema before it is put into service.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        match self {
            Self::LogisticRegression(m) => {
                check_names_for(ARTIFACT, m.feature_names.as_deref())?;
                check_params_for(ARTIFACT, "coefficients", &m.coefficients)?;
                if !m.intercept.is_finite() {
                    return Err(invalid("intercept is not finite".into()));
                }
            }
            Self::RandomForest(m) => {
                check_names_for(ARTIFACT, m.feature_names.as_deref())?;
                if m.trees.is_empty() {
                    return Err(invalid("forest has no trees".into()));
                }
                for (t, tree) in m.trees.iter().enumerate() {
                    tree.validate().map_err(|reason| invalid(format!("tree {t}: {reason}")))?;
                }
            }
        }
        Ok(())
    }
}

impl DecisionTree {
    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("no nodes".into());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split { feature, threshold, left, right } => {
                    if feature >= FEATURE_COUNT {
                        return Err(format!("node {i} splits on unknown feature {feature}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has a non-finite threshold"));
                    }
                    // Children come after their parent, which also rules out cycles.
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {i} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { probabilities } => {
                    if probabilities.iter().any(|p| !(0.0..=1.0).contains(p)) {
                        return Err(format!("leaf {i} has a probability outside [0, 1]"));
                    }
                    if (probabilities.iter().sum::<f64>() - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
                        return Err(format!("leaf {i} probabilities do not sum to 1"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf.
    fn leaf_probabilities(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        let mut idx = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..self.nodes.len() {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| InferenceError::Backend(format!("tree node {idx} out of range")))?;
            match *node {
                TreeNode::Leaf { probabilities } => return Ok(probabilities),
                TreeNode::Split { feature, threshold, left, right } => {
                    let x = features.get(feature).ok_or_else(|| {
                        InferenceError::Backend(format!("split on unknown feature {feature}"))
                    })?;
                    idx = if *x <= threshold { left } else { right };
                }
            }
        }
        Err(InferenceError::Backend("tree walk did not reach a leaf".into()))
    }
}

impl FraudClassifier for ModelArtifact {
    fn n_features(&self) -> usize {
        match self {
            Self::LogisticRegression(m) => m.coefficients.len(),
            // Forests do not record their width; trust the schema.
            Self::RandomForest(_) => FEATURE_COUNT,
        }
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        let expected = self.n_features();
        if features.len() != expected {
            return Err(InferenceError::DimensionMismatch {
                stage: ARTIFACT,
                expected,
                got: features.len(),
            });
        }

        let proba = match self {
            Self::LogisticRegression(m) => {
                let z: f64 = m
                    .coefficients
                    .iter()
                    .zip(features)
                    .map(|(w, x)| w * x)
                    .sum::<f64>()
                    + m.intercept;
                let p = sigmoid(z);
                [1.0 - p, p]
            }
            Self::RandomForest(m) => {
                let mut acc = [0.0; 2];
                for tree in &m.trees {
                    let leaf = tree.leaf_probabilities(features)?;
                    acc[0] += leaf[0];
                    acc[1] += leaf[1];
                }
                let n = m.trees.len().max(1) as f64;
                [acc[0] / n, acc[1] / n]
            }
        };

        check_probabilities(proba)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn check_probabilities(proba: [f64; 2]) -> Result<[f64; 2], InferenceError> {
    for p in proba {
        if !p.is_finite() {
            return Err(InferenceError::NonFinite { stage: ARTIFACT });
        }
        if !(0.0..=1.0).contains(&p) {
            return Err(InferenceError::InvalidProbability(p));
        }
    }
    Ok(proba)
}

/// Probability of the fraud class from a `[p_legit, p_fraud]` pair.
pub fn fraud_probability(proba: &[f64; 2]) -> f64 {
    proba[FRAUD_CLASS]
}

fn invalid(reason: String) -> ArtifactError {
    ArtifactError::InvalidParameter { artifact: ARTIFACT, reason }
}
