//! Result cache.
//!
//! Memoizes two things: catalog entries by `(media_type, id, language)` and
//! whole resolutions by `(title, year, media_type)`. Last write wins and keys
//! are stored exactly as given.

mod memory;
mod sqlite;

pub use memory::MemoryResultCache;
pub use sqlite::SqliteResultCache;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CatalogEntry, MediaType};
use crate::resolver::Resolution;

/// Errors from cache storage.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key of a cached resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolutionKey {
    pub title: String,
    pub year: Option<u32>,
    pub media_type: MediaType,
}

impl ResolutionKey {
    pub fn new(title: impl Into<String>, year: Option<u32>, media_type: MediaType) -> Self {
        Self {
            title: title.into(),
            year,
            media_type,
        }
    }
}

/// Storage for catalog entries and resolution results.
pub trait ResultCache: Send + Sync {
    /// Cached catalog entry.
    fn get_entry(
        &self,
        media_type: MediaType,
        id: u32,
        language: Option<&str>,
    ) -> Result<Option<CatalogEntry>, CacheError>;

    /// Store a catalog entry, replacing any previous value.
    fn set_entry(
        &self,
        media_type: MediaType,
        id: u32,
        entry: &CatalogEntry,
        language: Option<&str>,
    ) -> Result<(), CacheError>;

    /// Cached resolution.
    fn get_resolution(&self, key: &ResolutionKey) -> Result<Option<Resolution>, CacheError>;

    /// Store a resolution, replacing any previous value.
    fn set_resolution(&self, key: &ResolutionKey, resolution: &Resolution)
        -> Result<(), CacheError>;
}
