//! Media metadata catalog integration (TMDB).
//!
//! The resolver only talks to the [`MediaCatalog`] trait, so the HTTP client
//! can be swapped for a mock in tests.

mod tmdb;
mod types;

pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl CatalogError {
    /// Configuration problems are fatal for a resolution; everything else
    /// only means "this source produced nothing".
    pub fn is_configuration(&self) -> bool {
        matches!(self, CatalogError::NotConfigured(_))
    }

    /// Whether retrying the same idempotent request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            CatalogError::RateLimitExceeded => true,
            CatalogError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Operations the resolver needs from the media catalog.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Search movies by title, optionally restricted to a release year.
    async fn search_movies(
        &self,
        query: &str,
        year: Option<u32>,
    ) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Search series by name, optionally restricted to a first-air year.
    async fn search_series(
        &self,
        query: &str,
        year: Option<u32>,
    ) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Search movies and series at once. Non-media results are dropped.
    async fn search_multi(&self, query: &str) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Full details, including genres, seasons and alternate titles.
    async fn get_details(
        &self,
        media_type: MediaType,
        id: u32,
        language: Option<&str>,
    ) -> Result<CatalogEntry, CatalogError>;

    /// Alternate titles and translations of an entry.
    ///
    /// Convenience for callers that only need the names. The resolver's
    /// fuzzy passes read `alternate_titles` from [`get_details`] instead,
    /// since they also need the dates and return the detailed entry.
    ///
    /// [`get_details`]: MediaCatalog::get_details
    async fn get_alternate_titles(
        &self,
        media_type: MediaType,
        id: u32,
    ) -> Result<Vec<String>, CatalogError> {
        Ok(self.get_details(media_type, id, None).await?.alternate_titles)
    }
}
