// Adapters layer: concrete implementations of the domain ports.

pub mod news_api;
pub mod storage;

pub use news_api::{NewsApiClient, NewsQuery};
pub use storage::LocalStorage;
