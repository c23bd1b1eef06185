//! In-memory blacklist.

use std::sync::RwLock;

use chrono::Utc;

use super::{BlacklistEntry, BlacklistError, BlacklistStore, NewBlacklistEntry};

/// Blacklist kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryBlacklist {
    entries: RwLock<Vec<BlacklistEntry>>,
}

impl MemoryBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a blacklist from plain catalog IDs.
    pub fn with_ids(ids: impl IntoIterator<Item = u32>) -> Self {
        let now = Utc::now();
        let entries = ids
            .into_iter()
            .map(|catalog_id| BlacklistEntry {
                catalog_id,
                media_type: None,
                note: None,
                created_at: now,
            })
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

fn poisoned() -> BlacklistError {
    BlacklistError::Database("blacklist lock poisoned".to_string())
}

impl BlacklistStore for MemoryBlacklist {
    fn list(&self, max_count: usize) -> Result<Vec<BlacklistEntry>, BlacklistError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.iter().rev().take(max_count).cloned().collect())
    }

    fn add(&self, entry: NewBlacklistEntry) -> Result<BlacklistEntry, BlacklistError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.retain(|e| e.catalog_id != entry.catalog_id);
        let added = BlacklistEntry {
            catalog_id: entry.catalog_id,
            media_type: entry.media_type,
            note: entry.note,
            created_at: Utc::now(),
        };
        entries.push(added.clone());
        Ok(added)
    }

    fn remove(&self, catalog_id: u32) -> Result<BlacklistEntry, BlacklistError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let index = entries
            .iter()
            .position(|e| e.catalog_id == catalog_id)
            .ok_or(BlacklistError::NotFound(catalog_id))?;
        Ok(entries.remove(index))
    }
}
