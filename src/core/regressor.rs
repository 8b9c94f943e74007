//! Serialized regression models and the rounding applied to their output.
//!
//! Models are exported from training as JSON. Two shapes are understood:
//!
//! * `linear`: `{"kind": "linear", "coefficients": [...], "intercept": 0.0}`
//! * `tree_ensemble`: flat per-tree node arrays (`children_left`,
//!   `children_right`, `feature`, `threshold`, `value`), where a leaf has
//!   `children_left == -1`. Tree outputs are averaged (random forests) or
//!   summed onto `base_score` (gradient boosting).

use crate::domain::ports::Regressor;
use crate::utils::error::{Result, ServiceError};
use serde::Deserialize;

const LEAF: i64 = -1;

fn artifact_error(message: impl Into<String>) -> ServiceError {
    ServiceError::ArtifactError {
        artifact: "model".to_string(),
        message: message.into(),
    }
}

fn check_width(expected: usize, features: &[f64]) -> Result<()> {
    if features.len() != expected {
        return Err(ServiceError::ModelScoring {
            message: format!(
                "model expects {} features, got {}",
                expected,
                features.len()
            ),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl Regressor for LinearModel {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_width(self.coefficients.len(), features)?;
        Ok(self
            .coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (c, x)| acc + c * x))
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn name(&self) -> &str {
        "linear"
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl DecisionTree {
    fn validate(&self, index: usize, n_features: usize) -> Result<()> {
        let nodes = self.value.len();
        if nodes == 0 {
            return Err(artifact_error(format!("tree {} has no nodes", index)));
        }
        if [
            self.children_left.len(),
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
        ]
        .iter()
        .any(|len| *len != nodes)
        {
            return Err(artifact_error(format!(
                "tree {} has node arrays of different lengths",
                index
            )));
        }

        for node in 0..nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF && right == LEAF {
                continue;
            }
            // children always come after their parent, so traversal terminates
            let in_range = |child: i64| child > node as i64 && (child as usize) < nodes;
            if !in_range(left) || !in_range(right) {
                return Err(artifact_error(format!(
                    "tree {} node {} has invalid children ({}, {})",
                    index, node, left, right
                )));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(artifact_error(format!(
                    "tree {} node {} splits on feature {} of {}",
                    index, node, feature, n_features
                )));
            }
        }
        Ok(())
    }

    fn evaluate(&self, features: &[f64]) -> f64 {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let x = features[self.feature[node] as usize];
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        self.value[node]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Mean,
    Sum,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(artifact_error("tree ensemble has no trees"));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(index, self.n_features)?;
        }
        Ok(())
    }
}

impl Regressor for TreeEnsemble {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_width(self.n_features, features)?;
        let total: f64 = self.trees.iter().map(|tree| tree.evaluate(features)).sum();
        Ok(match self.aggregation {
            Aggregation::Mean => self.base_score + total / self.trees.len() as f64,
            Aggregation::Sum => self.base_score + total,
        })
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        match self.aggregation {
            Aggregation::Mean => "random_forest",
            Aggregation::Sum => "gradient_boosting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl RegressionModel {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let model: RegressionModel =
            serde_json::from_slice(bytes).map_err(|e| artifact_error(e.to_string()))?;
        match &model {
            RegressionModel::Linear(linear) => {
                if linear.coefficients.is_empty() {
                    return Err(artifact_error("linear model has no coefficients"));
                }
            }
            RegressionModel::TreeEnsemble(ensemble) => ensemble.validate()?,
        }
        Ok(model)
    }

    fn inner(&self) -> &dyn Regressor {
        match self {
            RegressionModel::Linear(m) => m,
            RegressionModel::TreeEnsemble(m) => m,
        }
    }
}

impl Regressor for RegressionModel {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        let score = self.inner().predict(features)?;
        if !score.is_finite() {
            return Err(ServiceError::ModelScoring {
                message: format!("{} model produced a non-finite score", self.name()),
            });
        }
        Ok(score)
    }

    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }
}

/// Round to the nearest hundred, ties to even, clamping negative prices to zero.
pub fn round_to_hundred(raw: f64) -> f64 {
    let rounded = (raw / 100.0).round_ties_even() * 100.0;
    if rounded <= 0.0 {
        0.0
    } else {
        rounded
    }
}
