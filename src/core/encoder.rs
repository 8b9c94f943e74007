use crate::domain::model::{FeatureRecord, FeatureValue};
use crate::utils::error::{Result, ServiceError};
use std::collections::{BTreeMap, HashMap};

/// Code assigned to a category the trained model never saw.
pub const UNKNOWN_CATEGORY: i64 = -1;

/// Vocabulary of one categorical field. A value's code is its position in the
/// vocabulary as exported at training time.
#[derive(Debug, Clone)]
pub struct CategoryEncoder {
    classes: Vec<String>,
    codes: HashMap<String, i64>,
}

impl CategoryEncoder {
    pub fn new(field: &str, classes: Vec<String>) -> Result<Self> {
        let mut codes = HashMap::with_capacity(classes.len());
        for (index, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), index as i64).is_some() {
                return Err(ServiceError::ArtifactError {
                    artifact: "label_encoders".to_string(),
                    message: format!("duplicate class '{}' for field '{}'", class, field),
                });
            }
        }
        Ok(Self { classes, codes })
    }

    pub fn encode(&self, value: &str) -> i64 {
        self.codes.get(value).copied().unwrap_or(UNKNOWN_CATEGORY)
    }

    pub fn decode(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(String::as_str)
    }
}

/// All categorical encoders, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct EncoderSet {
    encoders: BTreeMap<String, CategoryEncoder>,
}

impl EncoderSet {
    /// Parse `{"field": ["class0", "class1", ...], ...}`.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_slice(bytes).map_err(|e| ServiceError::ArtifactError {
                artifact: "label_encoders".to_string(),
                message: e.to_string(),
            })?;
        Self::from_vocabularies(raw)
    }

    pub fn from_vocabularies(raw: BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut encoders = BTreeMap::new();
        for (field, classes) in raw {
            let encoder = CategoryEncoder::new(&field, classes)?;
            encoders.insert(field, encoder);
        }
        Ok(Self { encoders })
    }

    pub fn get(&self, field: &str) -> Option<&CategoryEncoder> {
        self.encoders.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    /// Replace every encoded categorical column with its integer code.
    /// Unknown values become [`UNKNOWN_CATEGORY`]; fields without an encoder
    /// and encoders without a matching field are left alone.
    pub fn encode(&self, mut record: FeatureRecord) -> FeatureRecord {
        for (field, encoder) in &self.encoders {
            let code = match record.get(field) {
                Some(FeatureValue::Text(value)) => {
                    let code = encoder.encode(value);
                    if code == UNKNOWN_CATEGORY {
                        tracing::debug!("Unseen {} '{}', using sentinel code", field, value);
                    }
                    code
                }
                _ => continue,
            };
            record.insert(field.as_str(), FeatureValue::Number(code as f64));
        }
        record
    }
}
