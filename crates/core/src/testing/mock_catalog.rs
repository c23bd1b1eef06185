//! Mock media catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{CatalogEntry, CatalogError, MediaCatalog, MediaType};
use crate::names::normalize_title;

/// A recorded catalog query for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCatalogQuery {
    SearchMovies { query: String, year: Option<u32> },
    SearchSeries { query: String, year: Option<u32> },
    SearchMulti { query: String },
    GetDetails { media_type: MediaType, id: u32 },
}

/// Mock implementation of the MediaCatalog trait.
///
/// Entries are stored with full details. Searches match a query against the
/// title, original title and alternate titles after normalization, filter
/// by year, and return summaries (no genres, seasons or alternate titles)
/// the way the real search endpoints do.
///
/// # Example
///
/// ```rust,ignore
/// use mediamatch_core::testing::{MockCatalog, fixtures};
///
/// let catalog = MockCatalog::new();
/// catalog.add_entry(fixtures::movie(27205, "Inception", 2010)).await;
///
/// let results = catalog.search_movies("inception", Some(2010)).await?;
/// assert_eq!(results.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockCatalog {
    /// Entries by (type, id), in insertion order.
    entries: Arc<RwLock<Vec<CatalogEntry>>>,
    /// Extra names a search may find an entry by.
    aliases: Arc<RwLock<HashMap<String, Vec<(MediaType, u32)>>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedCatalogQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
    /// If set, every operation fails with an API error of this status.
    always_fail: Arc<RwLock<Option<u16>>>,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            aliases: Arc::new(RwLock::new(HashMap::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            always_fail: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Add (or replace) an entry with full details.
    pub async fn add_entry(&self, entry: CatalogEntry) {
        let mut entries = self.entries.write().await;
        entries.retain(|e| !(e.media_type == entry.media_type && e.id == entry.id));
        entries.push(entry);
    }

    /// Make searches for `name` also return the given entry.
    pub async fn add_search_alias(&self, name: &str, media_type: MediaType, id: u32) {
        self.aliases
            .write()
            .await
            .entry(normalize_title(name))
            .or_default()
            .push((media_type, id));
    }

    /// Clear all entries and aliases.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        self.aliases.write().await.clear();
    }

    // =========================================================================
    // Query Recording
    // =========================================================================

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedCatalogQuery> {
        self.queries.read().await.clone()
    }

    /// Clear recorded queries.
    pub async fn clear_recorded(&self) {
        self.queries.write().await.clear();
    }

    /// Get the number of queries performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every operation fail with an API error of the given status.
    pub async fn set_always_fail(&self, status: Option<u16>) {
        *self.always_fail.write().await = status;
    }

    /// Take the pending error, if any.
    async fn take_error(&self) -> Option<CatalogError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Some(err);
        }
        self.always_fail
            .read()
            .await
            .map(|status| CatalogError::ApiError {
                status,
                message: "mock failure".to_string(),
            })
    }

    /// Record a query.
    async fn record(&self, query: RecordedCatalogQuery) {
        self.queries.write().await.push(query);
    }

    /// Summaries of entries of `media_type` (any type if `None`) found by `query`.
    async fn search(
        &self,
        query: &str,
        media_type: Option<MediaType>,
        year: Option<u32>,
    ) -> Vec<CatalogEntry> {
        let wanted = normalize_title(query);
        let aliased = self
            .aliases
            .read()
            .await
            .get(&wanted)
            .cloned()
            .unwrap_or_default();

        self.entries
            .read()
            .await
            .iter()
            .filter(|e| media_type.map_or(true, |t| e.media_type == t))
            .filter(|e| year.map_or(true, |y| e.year() == Some(y)))
            .filter(|e| {
                aliased.contains(&(e.media_type, e.id))
                    || std::iter::once(&e.title)
                        .chain(e.original_title.as_ref())
                        .chain(e.alternate_titles.iter())
                        .any(|name| normalize_title(name) == wanted)
            })
            .map(summary_of)
            .collect()
    }
}

/// Strip what only the detail endpoint returns.
fn summary_of(entry: &CatalogEntry) -> CatalogEntry {
    CatalogEntry {
        alternate_titles: Vec::new(),
        genres: Vec::new(),
        seasons: Vec::new(),
        ..entry.clone()
    }
}

#[async_trait]
impl MediaCatalog for MockCatalog {
    async fn search_movies(
        &self,
        query: &str,
        year: Option<u32>,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.record(RecordedCatalogQuery::SearchMovies {
            query: query.to_string(),
            year,
        })
        .await;
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        Ok(self.search(query, Some(MediaType::Movie), year).await)
    }

    async fn search_series(
        &self,
        query: &str,
        year: Option<u32>,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.record(RecordedCatalogQuery::SearchSeries {
            query: query.to_string(),
            year,
        })
        .await;
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        Ok(self.search(query, Some(MediaType::Series), year).await)
    }

    async fn search_multi(&self, query: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.record(RecordedCatalogQuery::SearchMulti {
            query: query.to_string(),
        })
        .await;
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        Ok(self.search(query, None, None).await)
    }

    async fn get_details(
        &self,
        media_type: MediaType,
        id: u32,
        _language: Option<&str>,
    ) -> Result<CatalogEntry, CatalogError> {
        self.record(RecordedCatalogQuery::GetDetails { media_type, id })
            .await;
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.media_type == media_type && e.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("{} {} not found", media_type, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_search_returns_summaries() {
        let catalog = MockCatalog::new();
        catalog
            .add_entry(fixtures::series(100088, "The Last of Us", 2023, &[(1, 2023)]))
            .await;

        let results = catalog.search_series("the.last.of.us", None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].seasons.is_empty());
        assert!(!results[0].is_detailed());

        let details = catalog
            .get_details(MediaType::Series, 100088, None)
            .await
            .unwrap();
        assert!(details.is_detailed());
        assert_eq!(details.seasons.len(), 1);
    }

    #[tokio::test]
    async fn test_next_error_is_consumed() {
        let catalog = MockCatalog::new();
        catalog.set_next_error(CatalogError::RateLimitExceeded).await;

        assert!(catalog.search_multi("x").await.is_err());
        assert!(catalog.search_multi("x").await.is_ok());
        assert_eq!(catalog.query_count().await, 2);
    }

    #[tokio::test]
    async fn test_alias_search() {
        let catalog = MockCatalog::new();
        catalog.add_entry(fixtures::movie(1, "流浪地球", 2019)).await;
        catalog
            .add_search_alias("The Wandering Earth", MediaType::Movie, 1)
            .await;

        let results = catalog
            .search_movies("The Wandering Earth", None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "流浪地球");
    }

    #[tokio::test]
    async fn test_alternate_titles_come_from_details() {
        let catalog = MockCatalog::new();
        catalog
            .add_entry(fixtures::with_alternates(
                fixtures::movie(27205, "Inception", 2010),
                &["盗梦空间"],
            ))
            .await;

        let titles = catalog
            .get_alternate_titles(MediaType::Movie, 27205)
            .await
            .unwrap();
        assert_eq!(titles, vec!["盗梦空间".to_string()]);

        assert!(catalog
            .get_alternate_titles(MediaType::Series, 27205)
            .await
            .is_err());
    }
}
