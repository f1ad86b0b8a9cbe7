//! BoardGameGeek XML API2 client and the cache-through census service built on
//! it.

pub mod census;
pub mod client;
pub mod error;
pub mod settings;
pub mod xml;

pub use census::{Census, Lookup, PendingPolicy, WhoOwns};
pub use client::{BggClient, ClientConfig, DEFAULT_BASE_URL, Fetch};
pub use error::BggError;
pub use settings::{SettingSource, SettingSources, Settings, settings_path};
pub use xml::RawCollection;
