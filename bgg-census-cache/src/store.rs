use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Namespace for cache entries. Each category has its own maximum age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheCategory {
    /// A single user's collection, keyed by username.
    Collection,
    /// Game details, keyed by object id.
    Game,
}

impl CacheCategory {
    pub const ALL: [CacheCategory; 2] = [CacheCategory::Collection, CacheCategory::Game];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheCategory::Collection => "collection",
            CacheCategory::Game => "game",
        }
    }
}

impl std::fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CacheCategory {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "collection" | "collections" => Ok(CacheCategory::Collection),
            "game" | "games" => Ok(CacheCategory::Game),
            other => Err(CacheError::UnknownCategory(other.to_string())),
        }
    }
}

/// The current entry for a `(category, key)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub category: CacheCategory,
    pub key: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        category: CacheCategory,
        key: impl Into<String>,
        payload: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            category,
            key: key.into(),
            payload,
            created_at,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.created_at
    }

    /// An entry is stale once its age strictly exceeds `max_age`.
    pub fn is_stale(&self, max_age: TimeDelta, now: DateTime<Utc>) -> bool {
        self.age(now) > max_age
    }
}

/// Summary of a stored entry, for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheListing {
    pub category: CacheCategory,
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Maximum age per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub collection_max_age: TimeDelta,
    pub game_max_age: TimeDelta,
}

impl CachePolicy {
    pub const DEFAULT_COLLECTION_HOURS: i64 = 6;
    pub const DEFAULT_GAME_HOURS: i64 = 24;

    pub fn from_hours(collection_hours: i64, game_hours: i64) -> Self {
        Self {
            collection_max_age: TimeDelta::hours(collection_hours),
            game_max_age: TimeDelta::hours(game_hours),
        }
    }

    pub fn max_age(&self, category: CacheCategory) -> TimeDelta {
        match category {
            CacheCategory::Collection => self.collection_max_age,
            CacheCategory::Game => self.game_max_age,
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_hours(Self::DEFAULT_COLLECTION_HOURS, Self::DEFAULT_GAME_HOURS)
    }
}

/// Storage for cache entries. At most one entry exists per `(category, key)`.
///
/// Implementations must be safe to share across tasks; writes to the same key
/// are serialized.
pub trait CacheStore: Send + Sync {
    /// Newest entry for the key, unless it is older than `max_age`, in which
    /// case it is deleted and `None` is returned.
    fn get(
        &self,
        category: CacheCategory,
        key: &str,
        max_age: TimeDelta,
    ) -> Result<Option<CacheEntry>, CacheError>;

    /// Store `entry`, superseding any previous entry for the same key.
    fn insert(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Remove the entry for the key. Returns whether anything was removed.
    fn delete(&self, category: CacheCategory, key: &str) -> Result<bool, CacheError>;

    /// Remove every entry, or every entry in one category. Returns the count.
    fn clear(&self, category: Option<CacheCategory>) -> Result<usize, CacheError>;

    fn list(&self) -> Result<Vec<CacheListing>, CacheError>;

    /// Store a payload stamped with the current time.
    fn put(
        &self,
        category: CacheCategory,
        key: &str,
        payload: serde_json::Value,
    ) -> Result<CacheEntry, CacheError> {
        let entry = CacheEntry::new(category, key, payload, Utc::now());
        self.insert(entry.clone())?;
        Ok(entry)
    }
}
