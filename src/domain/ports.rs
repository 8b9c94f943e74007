use crate::domain::model::NewsArticle;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read access to wherever the trained artifacts live.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// A trained regression model. Implementations must be pure: the same
/// feature vector always yields the same score.
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Number of input columns the model was trained on.
    fn n_features(&self) -> usize;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch one page of raw articles, in provider order.
    async fn fetch_articles(&self) -> Result<Vec<NewsArticle>>;
}
