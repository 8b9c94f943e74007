use crate::domain::model::NewsArticle;
use crate::domain::ports::NewsSource;
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Fixed query sent to the news-search API on every `/news` request.
#[derive(Debug, Clone)]
pub struct NewsQuery {
    pub endpoint: String,
    pub topic: String,
    pub language: String,
    pub page_size: u32,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    results: Option<Vec<NewsArticle>>,
}

pub struct NewsApiClient {
    client: Client,
    query: NewsQuery,
}

impl NewsApiClient {
    pub fn new(query: NewsQuery) -> Result<Self> {
        let client = Client::builder().timeout(query.timeout).build()?;
        Ok(Self { client, query })
    }

    fn request_url(&self, api_key: &str) -> Result<Url> {
        let page_size = self.query.page_size.to_string();
        Url::parse_with_params(
            &self.query.endpoint,
            &[
                ("apikey", api_key),
                ("q", self.query.topic.as_str()),
                ("language", self.query.language.as_str()),
                ("size", page_size.as_str()),
            ],
        )
        .map_err(|e| ServiceError::InvalidConfigValueError {
            field: "news.endpoint".to_string(),
            value: self.query.endpoint.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn fetch_articles(&self) -> Result<Vec<NewsArticle>> {
        let api_key = self
            .query
            .api_key
            .as_deref()
            .ok_or_else(|| ServiceError::ConfigError {
                message: "news API key is not configured".to_string(),
            })?;
        let url = self.request_url(api_key)?;

        // the query string carries the key, so only the endpoint is logged
        tracing::debug!("Fetching news from {}", self.query.endpoint);
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!("News request timed out after {:?}", self.query.timeout);
            }
            ServiceError::FeedFetch {
                message: e.without_url().to_string(),
            }
        })?;

        let status = response.status();
        tracing::debug!("News API response status: {}", status);
        if !status.is_success() {
            return Err(ServiceError::FeedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| ServiceError::FeedFetch {
            message: e.without_url().to_string(),
        })?;
        let feed: FeedResponse =
            serde_json::from_slice(&body).map_err(|e| ServiceError::FeedDecode {
                message: e.to_string(),
            })?;

        match feed.results {
            Some(articles) if !articles.is_empty() => Ok(articles),
            _ => Err(ServiceError::EmptyResult),
        }
    }
}
