//! In-memory result cache backed by moka.

use moka::sync::Cache;

use super::{CacheError, ResolutionKey, ResultCache};
use crate::catalog::{CatalogEntry, MediaType};
use crate::resolver::Resolution;

type EntryKey = (MediaType, u32, Option<String>);

/// Bounded in-memory cache.
pub struct MemoryResultCache {
    entries: Cache<EntryKey, CatalogEntry>,
    resolutions: Cache<ResolutionKey, Resolution>,
}

impl MemoryResultCache {
    /// Create a cache holding at most `capacity` items of each kind.
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::new(capacity),
            resolutions: Cache::new(capacity),
        }
    }
}

impl Default for MemoryResultCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl ResultCache for MemoryResultCache {
    fn get_entry(
        &self,
        media_type: MediaType,
        id: u32,
        language: Option<&str>,
    ) -> Result<Option<CatalogEntry>, CacheError> {
        Ok(self
            .entries
            .get(&(media_type, id, language.map(str::to_string))))
    }

    fn set_entry(
        &self,
        media_type: MediaType,
        id: u32,
        entry: &CatalogEntry,
        language: Option<&str>,
    ) -> Result<(), CacheError> {
        self.entries.insert(
            (media_type, id, language.map(str::to_string)),
            entry.clone(),
        );
        Ok(())
    }

    fn get_resolution(&self, key: &ResolutionKey) -> Result<Option<Resolution>, CacheError> {
        Ok(self.resolutions.get(key))
    }

    fn set_resolution(
        &self,
        key: &ResolutionKey,
        resolution: &Resolution,
    ) -> Result<(), CacheError> {
        self.resolutions.insert(key.clone(), resolution.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_entry_round_trip() {
        let cache = MemoryResultCache::default();
        let entry = fixtures::movie(27205, "Inception", 2010);

        cache
            .set_entry(MediaType::Movie, 27205, &entry, Some("zh"))
            .unwrap();

        assert_eq!(
            cache.get_entry(MediaType::Movie, 27205, Some("zh")).unwrap(),
            Some(entry)
        );
        // Language is part of the key.
        assert_eq!(cache.get_entry(MediaType::Movie, 27205, None).unwrap(), None);
        assert_eq!(
            cache.get_entry(MediaType::Series, 27205, Some("zh")).unwrap(),
            None
        );
    }

    #[test]
    fn test_last_write_wins() {
        let cache = MemoryResultCache::default();
        let key = ResolutionKey::new("Inception", Some(2010), MediaType::Movie);

        cache
            .set_resolution(&key, &Resolution::unresolved(MediaType::Movie))
            .unwrap();
        let found = Resolution::found(
            fixtures::movie(27205, "Inception", 2010),
            crate::resolver::ResolutionSource::Direct,
        );
        cache.set_resolution(&key, &found).unwrap();

        assert_eq!(cache.get_resolution(&key).unwrap(), Some(found));
    }
}
