//! Mock web search engine for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::keyword::{SearchEngine, SearchEngineError, SearchPage};

/// Mock implementation of the SearchEngine trait.
///
/// Returns the same configured page for every phrase and records the
/// phrases it was asked for.
#[derive(Debug)]
pub struct MockSearchEngine {
    name: String,
    page: Arc<RwLock<SearchPage>>,
    queries: Arc<RwLock<Vec<String>>>,
    /// If true, every search fails.
    fail: Arc<RwLock<bool>>,
}

impl MockSearchEngine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page: Arc::new(RwLock::new(SearchPage::default())),
            queries: Arc::new(RwLock::new(Vec::new())),
            fail: Arc::new(RwLock::new(false)),
        }
    }

    /// Set the page returned for every search.
    pub async fn set_page(&self, page: SearchPage) {
        *self.page.write().await = page;
    }

    /// Make every search fail (or succeed again).
    pub async fn set_failure(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    /// Phrases searched so far.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl SearchEngine for MockSearchEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, phrase: &str) -> Result<SearchPage, SearchEngineError> {
        self.queries.write().await.push(phrase.to_string());

        if *self.fail.read().await {
            return Err(SearchEngineError::Status(503));
        }

        Ok(self.page.read().await.clone())
    }
}
