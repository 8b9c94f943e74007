use crate::domain::model::{FeatureRecord, FeatureValue, CATEGORICAL_FIELDS, NUMERIC_FIELDS};
use crate::utils::error::{Result, ServiceError};
use std::collections::BTreeSet;

/// Column order the trained model expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureOrder {
    columns: Vec<String>,
}

fn artifact_error(message: impl Into<String>) -> ServiceError {
    ServiceError::ArtifactError {
        artifact: "feature_order".to_string(),
        message: message.into(),
    }
}

impl FeatureOrder {
    /// The manifest must name every descriptor field exactly once and nothing else.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let expected: BTreeSet<&str> = CATEGORICAL_FIELDS
            .iter()
            .chain(NUMERIC_FIELDS.iter())
            .copied()
            .collect();

        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(artifact_error(format!("column '{}' listed twice", column)));
            }
            if !expected.contains(column.as_str()) {
                return Err(artifact_error(format!("unknown column '{}'", column)));
            }
        }

        let missing: Vec<&str> = expected.difference(&seen).copied().collect();
        if !missing.is_empty() {
            return Err(artifact_error(format!(
                "missing columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Self { columns })
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let columns: Vec<String> =
            serde_json::from_slice(bytes).map_err(|e| artifact_error(e.to_string()))?;
        Self::new(columns)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Flatten a fully encoded and scaled record into model input order.
    pub fn select(&self, record: &FeatureRecord) -> Result<Vec<f64>> {
        self.columns
            .iter()
            .map(|column| match record.get(column) {
                Some(FeatureValue::Number(n)) => Ok(*n),
                Some(FeatureValue::Text(_)) => Err(ServiceError::NonNumericFeature {
                    field: column.clone(),
                }),
                None => Err(ServiceError::MissingFeature {
                    field: column.clone(),
                }),
            })
            .collect()
    }
}
