use crate::domain::model::{FeatureRecord, FeatureValue, NUMERIC_FIELDS};
use crate::utils::error::{Result, ServiceError};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

#[derive(Debug, Clone, Deserialize)]
struct ScalerFile {
    #[serde(default)]
    features: Option<Vec<String>>,
    #[serde(flatten)]
    params: ScalerParams,
}

/// Affine transform over the numeric columns, fitted at training time.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericScaler {
    features: Vec<String>,
    params: ScalerParams,
}

fn artifact_error(message: impl Into<String>) -> ServiceError {
    ServiceError::ArtifactError {
        artifact: "scaler".to_string(),
        message: message.into(),
    }
}

impl NumericScaler {
    pub fn new(features: Vec<String>, params: ScalerParams) -> Result<Self> {
        let expected: Vec<String> = NUMERIC_FIELDS.iter().map(|f| f.to_string()).collect();
        if features != expected {
            return Err(artifact_error(format!(
                "scaler must cover {:?} in that order, got {:?}",
                NUMERIC_FIELDS, features
            )));
        }

        let (offsets, scale) = match &params {
            ScalerParams::Standard { mean, scale } => (mean, scale),
            ScalerParams::MinMax { min, scale } => (min, scale),
        };
        if offsets.len() != features.len() || scale.len() != features.len() {
            return Err(artifact_error(format!(
                "expected {} parameters per vector, got {} and {}",
                features.len(),
                offsets.len(),
                scale.len()
            )));
        }
        if offsets.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(artifact_error("parameters must be finite"));
        }
        if matches!(params, ScalerParams::Standard { .. }) && scale.iter().any(|s| *s == 0.0) {
            return Err(artifact_error("standard scale entries must be non-zero"));
        }

        Ok(Self { features, params })
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let file: ScalerFile =
            serde_json::from_slice(bytes).map_err(|e| artifact_error(e.to_string()))?;
        let features = file
            .features
            .unwrap_or_else(|| NUMERIC_FIELDS.iter().map(|f| f.to_string()).collect());
        Self::new(features, file.params)
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    fn transform_value(&self, index: usize, x: f64) -> f64 {
        match &self.params {
            ScalerParams::Standard { mean, scale } => (x - mean[index]) / scale[index],
            ScalerParams::MinMax { min, scale } => x * scale[index] + min[index],
        }
    }

    /// Scale the declared numeric columns in place. A declared column that is
    /// missing or not numeric means the record was built against a different
    /// schema, which is a configuration fault.
    pub fn scale(&self, mut record: FeatureRecord) -> Result<FeatureRecord> {
        for (index, field) in self.features.iter().enumerate() {
            let raw = match record.get(field) {
                Some(FeatureValue::Number(n)) => *n,
                Some(FeatureValue::Text(_)) => {
                    return Err(ServiceError::ConfigError {
                        message: format!("numeric field '{}' holds text", field),
                    })
                }
                None => {
                    return Err(ServiceError::ConfigError {
                        message: format!("numeric field '{}' is missing", field),
                    })
                }
            };
            record.insert(field.as_str(), FeatureValue::Number(self.transform_value(index, raw)));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_record(miles: f64, car_age: f64, engine_size: f64) -> FeatureRecord {
        let mut record = FeatureRecord::default();
        record.insert("miles", FeatureValue::Number(miles));
        record.insert("car_age", FeatureValue::Number(car_age));
        record.insert("engine_size", FeatureValue::Number(engine_size));
        record.insert("make", FeatureValue::Number(3.0));
        record
    }

    fn standard() -> NumericScaler {
        NumericScaler::from_json_slice(
            br#"{"kind": "standard", "mean": [50000.0, 5.0, 2.0], "scale": [25000.0, 2.0, 0.5]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_standard_scaling() {
        let scaled = standard().scale(numeric_record(75000.0, 3.0, 2.5)).unwrap();
        assert_eq!(scaled.get("miles"), Some(&FeatureValue::Number(1.0)));
        assert_eq!(scaled.get("car_age"), Some(&FeatureValue::Number(-1.0)));
        assert_eq!(scaled.get("engine_size"), Some(&FeatureValue::Number(1.0)));
        // categorical codes are untouched
        assert_eq!(scaled.get("make"), Some(&FeatureValue::Number(3.0)));
    }

    #[test]
    fn test_min_max_scaling() {
        let scaler = NumericScaler::from_json_slice(
            br#"{"kind": "min_max", "features": ["miles", "car_age", "engine_size"],
                 "min": [0.0, 0.0, -0.5], "scale": [0.5, 0.25, 0.25]}"#,
        )
        .unwrap();
        let scaled = scaler.scale(numeric_record(4.0, 2.0, 2.0)).unwrap();
        assert_eq!(scaled.get("miles").and_then(FeatureValue::as_number), Some(2.0));
        assert_eq!(scaled.get("car_age").and_then(FeatureValue::as_number), Some(0.5));
        assert_eq!(scaled.get("engine_size").and_then(FeatureValue::as_number), Some(0.0));
    }

    #[test]
    fn test_missing_numeric_field_is_config_error() {
        let mut record = numeric_record(1.0, 1.0, 1.0);
        record.remove("car_age");
        let err = standard().scale(record).unwrap_err();
        assert!(matches!(err, ServiceError::ConfigError { .. }));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(NumericScaler::from_json_slice(
            br#"{"kind": "standard", "mean": [0.0, 0.0], "scale": [1.0, 1.0]}"#
        )
        .is_err());
        assert!(NumericScaler::from_json_slice(
            br#"{"kind": "standard", "mean": [0.0, 0.0, 0.0], "scale": [1.0, 0.0, 1.0]}"#
        )
        .is_err());
        assert!(NumericScaler::from_json_slice(
            br#"{"kind": "standard", "features": ["car_age", "miles", "engine_size"],
                 "mean": [0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0]}"#
        )
        .is_err());
        assert!(NumericScaler::from_json_slice(br#"{"kind": "robust"}"#).is_err());
    }
}
