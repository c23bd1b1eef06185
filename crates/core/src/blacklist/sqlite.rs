//! SQLite-backed blacklist.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{BlacklistEntry, BlacklistError, BlacklistStore, NewBlacklistEntry};
use crate::catalog::MediaType;

/// SQLite-backed blacklist store.
pub struct SqliteBlacklist {
    conn: Mutex<Connection>,
}

impl SqliteBlacklist {
    /// Open (or create) the blacklist table in the database at `path`.
    pub fn new(path: &Path) -> Result<Self, BlacklistError> {
        let conn = Connection::open(path).map_err(|e| BlacklistError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory blacklist (useful for testing).
    pub fn in_memory() -> Result<Self, BlacklistError> {
        let conn =
            Connection::open_in_memory().map_err(|e| BlacklistError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), BlacklistError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS catalog_blacklist (
                catalog_id INTEGER PRIMARY KEY,
                media_type TEXT,
                note TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_catalog_blacklist_created_at
                ON catalog_blacklist(created_at);
            "#,
        )
        .map_err(|e| BlacklistError::Database(e.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, BlacklistError> {
        self.conn
            .lock()
            .map_err(|_| BlacklistError::Database("connection lock poisoned".to_string()))
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<BlacklistEntry> {
        let catalog_id: u32 = row.get(0)?;
        let media_type: Option<String> = row.get(1)?;
        let note: Option<String> = row.get(2)?;
        let created_at_str: String = row.get(3)?;

        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(BlacklistEntry {
            catalog_id,
            media_type: media_type.as_deref().and_then(MediaType::from_tag),
            note,
            created_at,
        })
    }

    fn get(conn: &Connection, catalog_id: u32) -> Result<Option<BlacklistEntry>, BlacklistError> {
        let result = conn.query_row(
            "SELECT catalog_id, media_type, note, created_at FROM catalog_blacklist WHERE catalog_id = ?",
            params![catalog_id],
            Self::row_to_entry,
        );

        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(BlacklistError::Database(e.to_string())),
        }
    }
}

impl BlacklistStore for SqliteBlacklist {
    fn list(&self, max_count: usize) -> Result<Vec<BlacklistEntry>, BlacklistError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(
                "SELECT catalog_id, media_type, note, created_at FROM catalog_blacklist ORDER BY created_at DESC, catalog_id DESC LIMIT ?",
            )
            .map_err(|e| BlacklistError::Database(e.to_string()))?;

        let limit = i64::try_from(max_count).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![limit], Self::row_to_entry)
            .map_err(|e| BlacklistError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row_result in rows {
            entries.push(row_result.map_err(|e| BlacklistError::Database(e.to_string()))?);
        }

        Ok(entries)
    }

    fn add(&self, entry: NewBlacklistEntry) -> Result<BlacklistEntry, BlacklistError> {
        let conn = self.lock()?;
        let now = Utc::now();

        conn.execute(
            "INSERT OR REPLACE INTO catalog_blacklist (catalog_id, media_type, note, created_at) VALUES (?, ?, ?, ?)",
            params![
                entry.catalog_id,
                entry.media_type.map(|t| t.as_str()),
                entry.note,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| BlacklistError::Database(e.to_string()))?;

        Ok(BlacklistEntry {
            catalog_id: entry.catalog_id,
            media_type: entry.media_type,
            note: entry.note,
            created_at: now,
        })
    }

    fn remove(&self, catalog_id: u32) -> Result<BlacklistEntry, BlacklistError> {
        let conn = self.lock()?;

        let entry = Self::get(&conn, catalog_id)?.ok_or(BlacklistError::NotFound(catalog_id))?;

        conn.execute(
            "DELETE FROM catalog_blacklist WHERE catalog_id = ?",
            params![catalog_id],
        )
        .map_err(|e| BlacklistError::Database(e.to_string()))?;

        Ok(entry)
    }
}
