pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::{router, serve, state::AppState};
pub use config::ServiceConfig;
pub use core::{artifacts::ModelArtifacts, news::NewsService, predict::PricePredictor};
pub use utils::error::{Result, ServiceError};
