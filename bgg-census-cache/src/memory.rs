use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{TimeDelta, Utc};

use crate::error::CacheError;
use crate::store::{CacheCategory, CacheEntry, CacheListing, CacheStore};

/// In-process cache store. Nothing survives the process; useful for tests and
/// for callers that only want request deduplication.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<(CacheCategory, String), CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(CacheCategory, String), CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn checked_key(key: &str) -> Result<String, CacheError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(CacheError::invalid_key(key));
    }
    Ok(trimmed.to_string())
}

impl CacheStore for MemoryCacheStore {
    fn get(
        &self,
        category: CacheCategory,
        key: &str,
        max_age: TimeDelta,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let id = (category, checked_key(key)?);
        let mut entries = self.lock();

        let stale = match entries.get(&id) {
            None => return Ok(None),
            Some(entry) => entry.is_stale(max_age, Utc::now()),
        };
        if stale {
            log::debug!("Deleting stale {category} cache for '{}'", id.1);
            entries.remove(&id);
            return Ok(None);
        }
        Ok(entries.get(&id).cloned())
    }

    fn insert(&self, mut entry: CacheEntry) -> Result<(), CacheError> {
        entry.key = checked_key(&entry.key)?;
        self.lock().insert((entry.category, entry.key.clone()), entry);
        Ok(())
    }

    fn delete(&self, category: CacheCategory, key: &str) -> Result<bool, CacheError> {
        let id = (category, checked_key(key)?);
        Ok(self.lock().remove(&id).is_some())
    }

    fn clear(&self, category: Option<CacheCategory>) -> Result<usize, CacheError> {
        let mut entries = self.lock();
        let before = entries.len();
        match category {
            Some(c) => entries.retain(|(entry_category, _), _| *entry_category != c),
            None => entries.clear(),
        }
        Ok(before - entries.len())
    }

    fn list(&self) -> Result<Vec<CacheListing>, CacheError> {
        let mut listings: Vec<CacheListing> = self
            .lock()
            .values()
            .map(|entry| CacheListing {
                category: entry.category,
                key: entry.key.clone(),
                created_at: entry.created_at,
                size_bytes: entry.payload.to_string().len() as u64,
            })
            .collect();
        listings.sort_by(|a, b| (a.category, &a.key).cmp(&(b.category, &b.key)));
        Ok(listings)
    }
}
