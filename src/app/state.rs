use crate::adapters::{LocalStorage, NewsApiClient};
use crate::config::ServiceConfig;
use crate::core::artifacts::ModelArtifacts;
use crate::core::news::NewsService;
use crate::core::predict::PricePredictor;
use crate::domain::ports::NewsSource;
use crate::utils::error::Result;
use std::sync::Arc;

/// Read-only context shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<PricePredictor>,
    pub news: NewsService,
}

impl AppState {
    pub fn new(artifacts: ModelArtifacts, news_source: Arc<dyn NewsSource>) -> Self {
        Self {
            predictor: Arc::new(PricePredictor::new(artifacts)),
            news: NewsService::new(news_source),
        }
    }

    /// Load artifacts from disk and build the news client. Errors are fatal.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let storage = LocalStorage::new(&config.artifacts.dir);
        tracing::info!("Loading model artifacts from {}", storage.base_path().display());
        let artifacts = ModelArtifacts::load(&storage, &config.artifacts.files).await?;

        let query = config.news.query();
        if query.api_key.is_none() {
            tracing::warn!(
                "{} is not set; /news will answer with an error",
                config.news.api_key_env
            );
        }
        let client = NewsApiClient::new(query)?;

        Ok(Self::new(artifacts, Arc::new(client)))
    }
}
