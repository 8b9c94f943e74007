use crate::core::encoder::EncoderSet;
use crate::core::regressor::RegressionModel;
use crate::core::reorder::FeatureOrder;
use crate::core::scaler::NumericScaler;
use crate::domain::model::CATEGORICAL_FIELDS;
use crate::domain::ports::{Regressor, Storage};
use crate::utils::error::{Result, ServiceError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// File names of the four training exports, relative to the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactFiles {
    pub model: String,
    pub encoders: String,
    pub scaler: String,
    pub feature_order: String,
}

impl Default for ArtifactFiles {
    fn default() -> Self {
        Self {
            model: "model.json".to_string(),
            encoders: "label_encoders.json".to_string(),
            scaler: "scaler.json".to_string(),
            feature_order: "feature_order.json".to_string(),
        }
    }
}

/// Everything the prediction pipeline needs, loaded once and never mutated.
#[derive(Clone)]
pub struct ModelArtifacts {
    pub encoders: EncoderSet,
    pub scaler: NumericScaler,
    pub order: FeatureOrder,
    pub model: Arc<dyn Regressor>,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("encoders", &self.encoders)
            .field("scaler", &self.scaler)
            .field("order", &self.order)
            .field("model", &self.model.name())
            .finish()
    }
}

async fn read_artifact<S: Storage>(storage: &S, path: &str) -> Result<Vec<u8>> {
    tracing::debug!("Reading artifact {}", path);
    storage
        .read_file(path)
        .await
        .map_err(|e| ServiceError::ArtifactError {
            artifact: path.to_string(),
            message: e.to_string(),
        })
}

impl ModelArtifacts {
    /// Load and cross-check all four artifacts. Any failure here is fatal.
    pub async fn load<S: Storage>(storage: &S, files: &ArtifactFiles) -> Result<Self> {
        let model = RegressionModel::from_json_slice(&read_artifact(storage, &files.model).await?)?;
        let encoders =
            EncoderSet::from_json_slice(&read_artifact(storage, &files.encoders).await?)?;
        let scaler = NumericScaler::from_json_slice(&read_artifact(storage, &files.scaler).await?)?;
        let order =
            FeatureOrder::from_json_slice(&read_artifact(storage, &files.feature_order).await?)?;

        let artifacts = Self::new(encoders, scaler, order, Arc::new(model))?;
        tracing::info!(
            "Loaded {} model with {} features and {} encoders",
            artifacts.model.name(),
            artifacts.order.len(),
            artifacts.encoders.fields().count()
        );
        Ok(artifacts)
    }

    pub fn new(
        encoders: EncoderSet,
        scaler: NumericScaler,
        order: FeatureOrder,
        model: Arc<dyn Regressor>,
    ) -> Result<Self> {
        if model.n_features() != order.len() {
            return Err(ServiceError::ArtifactError {
                artifact: "model".to_string(),
                message: format!(
                    "model takes {} features but the feature order lists {}",
                    model.n_features(),
                    order.len()
                ),
            });
        }

        let unencoded: Vec<&str> = CATEGORICAL_FIELDS
            .iter()
            .copied()
            .filter(|field| encoders.get(field).is_none())
            .collect();
        if !unencoded.is_empty() {
            return Err(ServiceError::ArtifactError {
                artifact: "label_encoders".to_string(),
                message: format!("no encoder for: {}", unencoded.join(", ")),
            });
        }

        for field in encoders.fields() {
            if !CATEGORICAL_FIELDS.contains(&field) {
                tracing::warn!("Ignoring encoder for unknown field '{}'", field);
            }
        }

        Ok(Self {
            encoders,
            scaler,
            order,
            model,
        })
    }
}
