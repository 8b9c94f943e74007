use crate::core::artifacts::ModelArtifacts;
use crate::core::regressor::round_to_hundred;
use crate::domain::model::{FeatureRecord, PricePrediction, VehicleDescriptor};
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::Validate;

impl Validate for VehicleDescriptor {
    fn validate(&self) -> Result<()> {
        if !self.engine_size.is_finite() || self.engine_size <= 0.0 {
            return Err(ServiceError::ValidationError {
                message: format!(
                    "engine_size must be a positive number, got {}",
                    self.engine_size
                ),
            });
        }
        Ok(())
    }
}

/// Parse and validate a `/predict` request body.
pub fn parse_vehicle(body: &[u8]) -> Result<VehicleDescriptor> {
    let vehicle: VehicleDescriptor =
        serde_json::from_slice(body).map_err(|e| ServiceError::ValidationError {
            message: e.to_string(),
        })?;
    vehicle.validate()?;
    Ok(vehicle)
}

/// Encode, scale, reorder, score and round one vehicle.
#[derive(Debug, Clone)]
pub struct PricePredictor {
    artifacts: ModelArtifacts,
}

impl PricePredictor {
    pub fn new(artifacts: ModelArtifacts) -> Self {
        Self { artifacts }
    }

    /// The ordered, fully transformed input vector for `vehicle`.
    pub fn features(&self, vehicle: &VehicleDescriptor) -> Result<Vec<f64>> {
        let record = FeatureRecord::from(vehicle);
        let record = self.artifacts.encoders.encode(record);
        let record = self.artifacts.scaler.scale(record)?;
        self.artifacts.order.select(&record)
    }

    pub fn predict(&self, vehicle: &VehicleDescriptor) -> Result<PricePrediction> {
        let features = self.features(vehicle)?;
        let raw = self.artifacts.model.predict(&features)?;
        let predicted_price = round_to_hundred(raw);

        if raw < 0.0 {
            tracing::warn!("Model returned negative price {:.2}, clamped to 0", raw);
        }
        tracing::debug!(
            "Predicted {} {} {}: raw {:.2}, rounded {}",
            vehicle.make,
            vehicle.model,
            vehicle.trim,
            raw,
            predicted_price
        );

        Ok(PricePrediction { predicted_price })
    }

    pub fn predict_body(&self, body: &[u8]) -> Result<PricePrediction> {
        let vehicle = parse_vehicle(body)?;
        self.predict(&vehicle)
    }
}
