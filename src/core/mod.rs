pub mod artifacts;
pub mod batch;
pub mod encoder;
pub mod news;
pub mod predict;
pub mod regressor;
pub mod reorder;
pub mod scaler;

pub use crate::domain::model::{FeatureRecord, FeatureValue, VehicleDescriptor};
pub use crate::domain::ports::{NewsSource, Regressor, Storage};
pub use crate::utils::error::Result;
