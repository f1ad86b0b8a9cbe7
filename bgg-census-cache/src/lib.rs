//! Keyed JSON cache in front of the upstream catalog.
//!
//! Entries are addressed by `(category, key)` and carry their creation time;
//! each category has its own maximum age. [`FileCacheStore`] persists one file
//! per entry, [`MemoryCacheStore`] keeps everything in a map.

pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use error::CacheError;
pub use file::FileCacheStore;
pub use memory::MemoryCacheStore;
pub use store::{CacheCategory, CacheEntry, CacheListing, CachePolicy, CacheStore};
