//! Catalog blacklist.
//!
//! Blacklisted catalog IDs are removed from every search result before any
//! matching happens, so a blacklisted entry is never resolved.

mod memory;
mod sqlite;

pub use memory::MemoryBlacklist;
pub use sqlite::SqliteBlacklist;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::MediaType;

/// Errors from blacklist storage.
#[derive(Debug, Error)]
pub enum BlacklistError {
    #[error("Blacklist entry not found: {0}")]
    NotFound(u32),

    #[error("Database error: {0}")]
    Database(String),
}

/// A blacklisted catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// Catalog ID that must never be returned.
    pub catalog_id: u32,
    /// Informational only; filtering is by ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request to blacklist a catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBlacklistEntry {
    pub catalog_id: u32,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Storage for blacklisted catalog IDs.
pub trait BlacklistStore: Send + Sync {
    /// List at most `max_count` entries, newest first.
    fn list(&self, max_count: usize) -> Result<Vec<BlacklistEntry>, BlacklistError>;

    /// Add (or replace) an entry.
    fn add(&self, entry: NewBlacklistEntry) -> Result<BlacklistEntry, BlacklistError>;

    /// Remove an entry, returning it.
    fn remove(&self, catalog_id: u32) -> Result<BlacklistEntry, BlacklistError>;
}
