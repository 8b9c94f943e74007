use crate::domain::model::NewsArticle;
use crate::domain::ports::NewsSource;
use crate::utils::error::Result;
use std::collections::HashSet;
use std::sync::Arc;

pub const TITLE_KEY_LEN: usize = 25;
pub const DESCRIPTION_KEY_LEN: usize = 50;

/// Collapse whitespace runs, lowercase and keep the first `max_chars` characters.
pub fn normalize(text: &str, max_chars: usize) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .chars()
        .take(max_chars)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub title: String,
    pub href: String,
    pub description: String,
}

impl Fingerprint {
    pub fn of(article: &NewsArticle) -> Self {
        Self {
            title: normalize(article.title(), TITLE_KEY_LEN),
            href: article.href().trim().to_string(),
            description: normalize(article.description(), DESCRIPTION_KEY_LEN),
        }
    }
}

/// First-seen-wins filter. A match on any one fingerprint drops the article.
#[derive(Debug, Default)]
pub struct Deduplicator {
    titles: HashSet<String>,
    hrefs: HashSet<String>,
    descriptions: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records the fingerprints when the article is new.
    pub fn admit(&mut self, article: &NewsArticle) -> bool {
        if article.title().trim().is_empty() || article.href().trim().is_empty() {
            return false;
        }

        let key = Fingerprint::of(article);
        if self.titles.contains(&key.title)
            || self.hrefs.contains(&key.href)
            || self.descriptions.contains(&key.description)
        {
            return false;
        }

        self.titles.insert(key.title);
        self.hrefs.insert(key.href);
        self.descriptions.insert(key.description);
        true
    }
}

pub fn dedup_articles(articles: Vec<NewsArticle>) -> Vec<NewsArticle> {
    let mut dedup = Deduplicator::new();
    articles
        .into_iter()
        .filter(|article| dedup.admit(article))
        .collect()
}

/// Fetch one page from the provider and drop near-duplicates.
#[derive(Clone)]
pub struct NewsService {
    source: Arc<dyn NewsSource>,
}

impl NewsService {
    pub fn new(source: Arc<dyn NewsSource>) -> Self {
        Self { source }
    }

    pub async fn latest(&self) -> Result<Vec<NewsArticle>> {
        let articles = self.source.fetch_articles().await?;
        let received = articles.len();
        let unique = dedup_articles(articles);
        tracing::info!(
            "News feed returned {} articles, {} after deduplication",
            received,
            unique.len()
        );
        Ok(unique)
    }
}
