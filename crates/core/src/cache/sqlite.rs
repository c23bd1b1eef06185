//! SQLite-backed result cache.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{CacheError, ResolutionKey, ResultCache};
use crate::catalog::{CatalogEntry, MediaType};
use crate::resolver::Resolution;

/// SQLite-backed result cache. Payloads are stored as JSON.
pub struct SqliteResultCache {
    conn: Mutex<Connection>,
}

impl SqliteResultCache {
    /// Open (or create) the cache tables in the database at `path`.
    pub fn new(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path).map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory().map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // Optional key parts are stored as '' / 0 so the primary keys stay unique.
    fn initialize_schema(conn: &Connection) -> Result<(), CacheError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS catalog_entries (
                media_type TEXT NOT NULL,
                id INTEGER NOT NULL,
                language TEXT NOT NULL DEFAULT '',
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (media_type, id, language)
            );

            CREATE TABLE IF NOT EXISTS resolutions (
                title TEXT NOT NULL,
                year INTEGER NOT NULL DEFAULT 0,
                media_type TEXT NOT NULL,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (title, year, media_type)
            );
            "#,
        )
        .map_err(|e| CacheError::Database(e.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn
            .lock()
            .map_err(|_| CacheError::Database("connection lock poisoned".to_string()))
    }
}

impl ResultCache for SqliteResultCache {
    fn get_entry(
        &self,
        media_type: MediaType,
        id: u32,
        language: Option<&str>,
    ) -> Result<Option<CatalogEntry>, CacheError> {
        let conn = self.lock()?;

        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM catalog_entries WHERE media_type = ? AND id = ? AND language = ?",
                params![media_type.as_str(), id, language.unwrap_or("")],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| CacheError::Database(e.to_string()))?;

        payload
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(CacheError::from)
    }

    fn set_entry(
        &self,
        media_type: MediaType,
        id: u32,
        entry: &CatalogEntry,
        language: Option<&str>,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(entry)?;
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO catalog_entries (media_type, id, language, payload, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![
                media_type.as_str(),
                id,
                language.unwrap_or(""),
                payload,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_resolution(&self, key: &ResolutionKey) -> Result<Option<Resolution>, CacheError> {
        let conn = self.lock()?;

        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM resolutions WHERE title = ? AND year = ? AND media_type = ?",
                params![key.title, key.year.unwrap_or(0), key.media_type.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| CacheError::Database(e.to_string()))?;

        payload
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(CacheError::from)
    }

    fn set_resolution(
        &self,
        key: &ResolutionKey,
        resolution: &Resolution,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(resolution)?;
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO resolutions (title, year, media_type, payload, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![
                key.title,
                key.year.unwrap_or(0),
                key.media_type.as_str(),
                payload,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        Ok(())
    }
}
