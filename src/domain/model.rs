use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const CATEGORICAL_FIELDS: [&str; 6] = [
    "make",
    "model",
    "trim",
    "body_type",
    "drivetrain",
    "transmission",
];

pub const NUMERIC_FIELDS: [&str; 3] = ["miles", "car_age", "engine_size"];

/// Vehicle description as posted to `/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleDescriptor {
    pub make: String,
    pub model: String,
    pub trim: String,
    pub body_type: String,
    pub drivetrain: String,
    pub transmission: String,
    #[serde(deserialize_with = "whole_number")]
    pub miles: u64,
    #[serde(deserialize_with = "whole_number")]
    pub car_age: u64,
    pub engine_size: f64,
}

/// Non-negative integer, also accepting floats with no fractional part
/// (`42000.0`) as clients serialising through a float type send them.
fn whole_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct WholeNumber;

    impl<'de> Visitor<'de> for WholeNumber {
        type Value = u64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative whole number")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
            if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64 {
                Ok(v as u64)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(WholeNumber)
}

/// A single column of a feature record before it reaches the model.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Text(String),
    Number(f64),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    pub data: HashMap<String, FeatureValue>,
}

impl FeatureRecord {
    pub fn get(&self, field: &str) -> Option<&FeatureValue> {
        self.data.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FeatureValue) {
        self.data.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<FeatureValue> {
        self.data.remove(field)
    }
}

impl From<&VehicleDescriptor> for FeatureRecord {
    fn from(vehicle: &VehicleDescriptor) -> Self {
        let mut record = FeatureRecord::default();
        record.insert("make", FeatureValue::Text(vehicle.make.clone()));
        record.insert("model", FeatureValue::Text(vehicle.model.clone()));
        record.insert("trim", FeatureValue::Text(vehicle.trim.clone()));
        record.insert("body_type", FeatureValue::Text(vehicle.body_type.clone()));
        record.insert("drivetrain", FeatureValue::Text(vehicle.drivetrain.clone()));
        record.insert(
            "transmission",
            FeatureValue::Text(vehicle.transmission.clone()),
        );
        record.insert("miles", FeatureValue::Number(vehicle.miles as f64));
        record.insert("car_age", FeatureValue::Number(vehicle.car_age as f64));
        record.insert("engine_size", FeatureValue::Number(vehicle.engine_size));
        record
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePrediction {
    pub predicted_price: f64,
}

/// A news article exactly as the provider returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewsArticle(pub serde_json::Map<String, serde_json::Value>);

impl NewsArticle {
    fn text_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.as_str())
    }

    pub fn title(&self) -> &str {
        self.text_field("title").unwrap_or("")
    }

    /// `href`, falling back to the `link` key some providers use.
    pub fn href(&self) -> &str {
        self.text_field("href")
            .or_else(|| self.text_field("link"))
            .unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.text_field("description").unwrap_or("")
    }
}
