//! Mock catalog website lookup for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::MediaType;
use crate::names::normalize_title;
use crate::web_lookup::{WebHit, WebLookup, WebLookupError};

/// Mock implementation of the WebLookup trait.
///
/// Hits are configured per name. A Series hint filters the configured hits
/// down to series, like the real search page selector does.
#[derive(Debug, Default)]
pub struct MockWebLookup {
    hits: Arc<RwLock<HashMap<String, Vec<WebHit>>>>,
    queries: Arc<RwLock<Vec<(String, MediaType)>>>,
    fail: Arc<RwLock<bool>>,
}

impl MockWebLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hits returned for `name`.
    pub async fn set_hits(&self, name: &str, hits: Vec<WebHit>) {
        self.hits.write().await.insert(normalize_title(name), hits);
    }

    /// Make every lookup fail (or succeed again).
    pub async fn set_failure(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    /// Lookups performed so far.
    pub async fn recorded_queries(&self) -> Vec<(String, MediaType)> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl WebLookup for MockWebLookup {
    async fn lookup(
        &self,
        name: &str,
        media_type: MediaType,
    ) -> Result<Vec<WebHit>, WebLookupError> {
        self.queries
            .write()
            .await
            .push((name.to_string(), media_type));

        if *self.fail.read().await {
            return Err(WebLookupError::Status(500));
        }

        let hits = self
            .hits
            .read()
            .await
            .get(&normalize_title(name))
            .cloned()
            .unwrap_or_default();

        Ok(hits
            .into_iter()
            .filter(|h| media_type != MediaType::Series || h.media_type == MediaType::Series)
            .collect())
    }
}
