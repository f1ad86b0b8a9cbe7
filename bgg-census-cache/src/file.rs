//! File-backed cache store.
//!
//! Layout: `{root}/{category}/{category}_{key}_{timestamp}.cache.json`, where
//! the timestamp is UTC formatted as `%Y-%m-%d-%H-%M-%S`. Category directories
//! are created on first use.
//!
//! Keys are percent-encoded in file names (everything but `[A-Za-z0-9._-]`),
//! so distinct keys never share a file. File names are parsed in full, so the
//! key `bob` never matches a file that belongs to `bob_smith`. Writes land in
//! a temp file that is renamed into place, then every other file for the key
//! is removed.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::CacheError;
use crate::store::{CacheCategory, CacheEntry, CacheListing, CacheStore};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";
/// Width of a formatted [`TIMESTAMP_FORMAT`] value.
const TIMESTAMP_LEN: usize = 19;
const FILE_SUFFIX: &str = ".cache.json";
/// Bytes escaped when a key is embedded in a file name.
const KEY_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'_').remove(b'-');

/// A cache file located on disk.
#[derive(Debug, Clone)]
struct StoredFile {
    path: PathBuf,
    category: CacheCategory,
    key: String,
    created_at: DateTime<Utc>,
}

/// Cache store that keeps one JSON file per entry.
#[derive(Debug)]
pub struct FileCacheStore {
    root: PathBuf,
    locks: Mutex<HashMap<(CacheCategory, String), Arc<Mutex<()>>>>,
}

impl FileCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Default location: `~/.cache/bgg-census` (platform equivalent).
    pub fn default_dir() -> Result<PathBuf, CacheError> {
        let base = dirs::cache_dir().ok_or(CacheError::NoCacheDir)?;
        Ok(base.join("bgg-census"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: CacheCategory) -> PathBuf {
        self.root.join(category.as_str())
    }

    fn ensure_dir(&self, category: CacheCategory) -> Result<PathBuf, CacheError> {
        let dir = self.category_dir(category);
        fs::create_dir_all(&dir).map_err(CacheError::io(&dir))?;
        Ok(dir)
    }

    /// Run `f` while holding the lock for one entry, so concurrent writers
    /// never interleave. The lock is dropped from the table once nobody else
    /// is waiting on it.
    fn with_key_lock<T>(
        &self,
        category: CacheCategory,
        key: &str,
        f: impl FnOnce() -> Result<T, CacheError>,
    ) -> Result<T, CacheError> {
        let slot = (category, key.to_string());
        let lock = recover(self.locks.lock())
            .entry(slot.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = recover(lock.lock());
            f()
        };

        // Clones are only handed out under the table lock, so the count
        // cannot grow while we hold it
        let mut locks = recover(self.locks.lock());
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&slot);
        }
        result
    }

    /// Every parseable cache file in a category directory.
    fn scan(&self, category: CacheCategory) -> Result<Vec<StoredFile>, CacheError> {
        let dir = self.category_dir(category);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(&dir)(e)),
        };

        let mut files = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some((file_category, key, created_at)) = parse_file_name(name) {
                if file_category == category {
                    files.push(StoredFile {
                        path,
                        category,
                        key,
                        created_at,
                    });
                }
            }
        }
        Ok(files)
    }

    /// Files for one key, oldest first.
    fn files_for(&self, category: CacheCategory, key: &str) -> Result<Vec<StoredFile>, CacheError> {
        let mut files: Vec<StoredFile> = self
            .scan(category)?
            .into_iter()
            .filter(|f| f.key == key)
            .collect();
        files.sort_by_key(|f| f.created_at);
        Ok(files)
    }
}

impl CacheStore for FileCacheStore {
    fn get(
        &self,
        category: CacheCategory,
        key: &str,
        max_age: TimeDelta,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let key = checked_key(key)?;
        self.ensure_dir(category)?;
        self.with_key_lock(category, key, || self.read_newest(category, key, max_age))
    }

    fn insert(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let key = checked_key(&entry.key)?.to_string();
        let dir = self.ensure_dir(entry.category)?;
        self.with_key_lock(entry.category, &key, || {
            let file_name = entry_file_name(entry.category, &key, entry.created_at);
            let path = dir.join(&file_name);
            let tmp = dir.join(format!(".{file_name}.tmp"));

            log::debug!("Creating {} cache for '{key}'", entry.category);
            let contents = serde_json::to_vec(&entry.payload)?;
            fs::write(&tmp, contents).map_err(CacheError::io(&tmp))?;
            fs::rename(&tmp, &path).map_err(CacheError::io(&path))?;

            for old in self.files_for(entry.category, &key)? {
                if old.path != path {
                    remove_if_present(&old.path)?;
                }
            }
            Ok(())
        })
    }

    fn delete(&self, category: CacheCategory, key: &str) -> Result<bool, CacheError> {
        let key = checked_key(key)?;
        self.with_key_lock(category, key, || {
            let mut removed = false;
            for file in self.files_for(category, key)? {
                removed |= remove_if_present(&file.path)?;
            }
            if removed {
                log::debug!("Deleted {category} cache for '{key}'");
            }
            Ok(removed)
        })
    }

    fn clear(&self, category: Option<CacheCategory>) -> Result<usize, CacheError> {
        let categories: Vec<CacheCategory> = match category {
            Some(c) => vec![c],
            None => CacheCategory::ALL.to_vec(),
        };

        let mut count = 0;
        for category in categories {
            for file in self.scan(category)? {
                if self.with_key_lock(category, &file.key, || remove_if_present(&file.path))? {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    fn list(&self) -> Result<Vec<CacheListing>, CacheError> {
        let mut listings = Vec::new();
        for category in CacheCategory::ALL {
            for file in self.scan(category)? {
                let size_bytes = fs::metadata(&file.path).map(|m| m.len()).unwrap_or(0);
                listings.push(CacheListing {
                    category: file.category,
                    key: file.key,
                    created_at: file.created_at,
                    size_bytes,
                });
            }
        }
        listings.sort_by(|a, b| (a.category, &a.key).cmp(&(b.category, &b.key)));
        Ok(listings)
    }
}

impl FileCacheStore {
    /// Newest file for a key, removing orphans and stale or corrupt entries.
    /// Caller holds the key lock.
    fn read_newest(
        &self,
        category: CacheCategory,
        key: &str,
        max_age: TimeDelta,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let mut files = self.files_for(category, key)?;
        let Some(newest) = files.pop() else {
            return Ok(None);
        };

        // Anything left over is an orphan from an older write
        for orphan in &files {
            log::debug!("Removing orphaned cache file {}", orphan.path.display());
            remove_if_present(&orphan.path)?;
        }

        if Utc::now() - newest.created_at > max_age {
            log::debug!("Deleting stale {category} cache for '{key}'");
            remove_if_present(&newest.path)?;
            return Ok(None);
        }

        let bytes = fs::read(&newest.path).map_err(CacheError::io(&newest.path))?;
        match serde_json::from_slice(&bytes) {
            Ok(payload) => {
                log::debug!("Using cached {category} for '{key}'");
                Ok(Some(CacheEntry::new(
                    category,
                    key,
                    payload,
                    newest.created_at,
                )))
            }
            Err(e) => {
                log::warn!(
                    "Discarding unreadable cache file {}: {e}",
                    newest.path.display()
                );
                remove_if_present(&newest.path)?;
                Ok(None)
            }
        }
    }
}

/// Trim a key and reject blank ones.
fn checked_key(key: &str) -> Result<&str, CacheError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(CacheError::invalid_key(key));
    }
    Ok(trimmed)
}

/// Percent-encode a key for use in a file name. Reversed by [`decode_key`].
fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_ESCAPES).to_string()
}

fn decode_key(encoded: &str) -> Option<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .ok()
        .map(|k| k.into_owned())
}

fn entry_file_name(category: CacheCategory, key: &str, created_at: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}{}",
        category.as_str(),
        encode_key(key),
        created_at.format(TIMESTAMP_FORMAT),
        FILE_SUFFIX
    )
}

/// Split `{category}_{key}_{timestamp}.cache.json` into its parts.
fn parse_file_name(name: &str) -> Option<(CacheCategory, String, DateTime<Utc>)> {
    let stem = name.strip_suffix(FILE_SUFFIX)?;
    if stem.len() < TIMESTAMP_LEN + 1 || !stem.is_char_boundary(stem.len() - TIMESTAMP_LEN) {
        return None;
    }

    let (head, stamp) = stem.split_at(stem.len() - TIMESTAMP_LEN);
    let head = head.strip_suffix('_')?;
    let (category, key) = head.split_once('_')?;
    if key.is_empty() {
        return None;
    }

    let category = match category {
        "collection" => CacheCategory::Collection,
        "game" => CacheCategory::Game,
        _ => return None,
    };
    let created_at = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
        .ok()?
        .and_utc();
    Some((category, decode_key(key)?, created_at))
}

fn remove_if_present(path: &Path) -> Result<bool, CacheError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CacheError::io(path)(e)),
    }
}

/// The guarded data is either `()` or a lock table, both fine to reuse after a
/// panic elsewhere.
fn recover<T>(result: std::sync::LockResult<MutexGuard<'_, T>>) -> MutexGuard<'_, T> {
    result.unwrap_or_else(|poisoned| poisoned.into_inner())
}
