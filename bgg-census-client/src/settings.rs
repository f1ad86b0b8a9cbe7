//! User settings: `~/.config/bgg-census/settings.toml` plus environment
//! overrides.
//!
//! Priority for every field is env var > settings file > default. The
//! resolved [`SettingSources`] records where each user-visible value came
//! from so `config show` can explain it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use bgg_census_cache::{CacheError, CachePolicy, FileCacheStore};

use crate::census::PendingPolicy;
use crate::client::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::BggError;

pub const ENV_API_TOKEN: &str = "BGG_CENSUS_API_TOKEN";
pub const ENV_CACHE_DIR: &str = "BGG_CENSUS_CACHE_DIR";
pub const ENV_BASE_URL: &str = "BGG_CENSUS_BASE_URL";
pub const ENV_KNOWN_USERS: &str = "BGG_CENSUS_KNOWN_USERS";

/// Canonical path to the settings file.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("bgg-census").join("settings.toml")
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub api_token: Option<String>,
    /// `None` means the platform cache directory.
    pub cache_dir: Option<PathBuf>,
    pub collection_max_age_hours: i64,
    pub game_max_age_hours: i64,
    pub known_users: Vec<String>,
    pub request_interval_ms: u64,
    pub retry_delay_ms: u64,
    pub pending_retries: u32,
    pub pending_delay_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let client = ClientConfig::default();
        let pending = PendingPolicy::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            cache_dir: None,
            collection_max_age_hours: CachePolicy::DEFAULT_COLLECTION_HOURS,
            game_max_age_hours: CachePolicy::DEFAULT_GAME_HOURS,
            known_users: Vec::new(),
            request_interval_ms: client.request_interval.as_millis() as u64,
            retry_delay_ms: client.retry_delay.as_millis() as u64,
            pending_retries: pending.retries,
            pending_delay_secs: pending.delay.as_secs(),
        }
    }
}

/// Where a setting's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingSource {
    EnvVar(&'static str),
    ConfigFile,
    Default,
}

impl std::fmt::Display for SettingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Provenance of the fields that can be overridden from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingSources {
    pub base_url: SettingSource,
    pub api_token: SettingSource,
    pub cache_dir: SettingSource,
    pub known_users: SettingSource,
}

/// TOML file format.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub bgg: BggSection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub census: CensusSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BggSection {
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    pub request_interval_ms: Option<u64>,
    pub retry_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CacheSection {
    pub dir: Option<PathBuf>,
    pub collection_max_age_hours: Option<i64>,
    pub game_max_age_hours: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CensusSection {
    pub known_users: Option<Vec<String>>,
    pub pending_retries: Option<u32>,
    pub pending_delay_secs: Option<u64>,
}

impl SettingsFile {
    pub fn parse(contents: &str) -> Result<Self, BggError> {
        toml::from_str(contents).map_err(|e| BggError::config(format!("Invalid settings: {e}")))
    }

    /// Read a settings file. A missing file is not an error.
    pub fn read(path: &Path) -> Result<Option<Self>, BggError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents)
                .map(Some)
                .map_err(|e| BggError::config(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BggError::config(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn split_users(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pick the env value, else the file value, else nothing, and say which.
fn layered<T>(
    env_var: &'static str,
    env_value: Option<T>,
    file_value: Option<T>,
) -> (Option<T>, SettingSource) {
    match (env_value, file_value) {
        (Some(v), _) => (Some(v), SettingSource::EnvVar(env_var)),
        (None, Some(v)) => (Some(v), SettingSource::ConfigFile),
        (None, None) => (None, SettingSource::Default),
    }
}

impl Settings {
    /// Load from the settings file and the process environment.
    pub fn load() -> Result<(Self, SettingSources), BggError> {
        let file = SettingsFile::read(&settings_path())?;
        Ok(Self::resolve(file, |var| std::env::var(var).ok()))
    }

    /// Merge a parsed settings file with environment values supplied by `env`.
    pub fn resolve(
        file: Option<SettingsFile>,
        env: impl Fn(&str) -> Option<String>,
    ) -> (Self, SettingSources) {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let (base_url, base_url_source) = layered(
            ENV_BASE_URL,
            non_empty(env(ENV_BASE_URL)),
            non_empty(file.bgg.base_url),
        );
        let (api_token, api_token_source) = layered(
            ENV_API_TOKEN,
            non_empty(env(ENV_API_TOKEN)),
            non_empty(file.bgg.api_token),
        );
        let (cache_dir, cache_dir_source) = layered(
            ENV_CACHE_DIR,
            non_empty(env(ENV_CACHE_DIR)).map(PathBuf::from),
            file.cache.dir,
        );
        let (known_users, known_users_source) = layered(
            ENV_KNOWN_USERS,
            env(ENV_KNOWN_USERS).map(|v| split_users(&v)),
            file.census.known_users,
        );

        let settings = Self {
            base_url: base_url.unwrap_or(defaults.base_url),
            api_token,
            cache_dir,
            collection_max_age_hours: file
                .cache
                .collection_max_age_hours
                .unwrap_or(defaults.collection_max_age_hours),
            game_max_age_hours: file
                .cache
                .game_max_age_hours
                .unwrap_or(defaults.game_max_age_hours),
            known_users: known_users.unwrap_or_default(),
            request_interval_ms: file
                .bgg
                .request_interval_ms
                .unwrap_or(defaults.request_interval_ms),
            retry_delay_ms: file.bgg.retry_delay_ms.unwrap_or(defaults.retry_delay_ms),
            pending_retries: file
                .census
                .pending_retries
                .unwrap_or(defaults.pending_retries),
            pending_delay_secs: file
                .census
                .pending_delay_secs
                .unwrap_or(defaults.pending_delay_secs),
        };
        let sources = SettingSources {
            base_url: base_url_source,
            api_token: api_token_source,
            cache_dir: cache_dir_source,
            known_users: known_users_source,
        };
        (settings, sources)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            api_token: self.api_token.clone(),
            request_interval: Duration::from_millis(self.request_interval_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            ..ClientConfig::default()
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::from_hours(self.collection_max_age_hours, self.game_max_age_hours)
    }

    pub fn pending_policy(&self) -> PendingPolicy {
        PendingPolicy {
            retries: self.pending_retries,
            delay: Duration::from_secs(self.pending_delay_secs),
        }
    }

    /// The configured cache directory, or the platform default.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf, CacheError> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => FileCacheStore::default_dir(),
        }
    }

    /// Render the effective settings back into the file format.
    pub fn to_toml(&self) -> Result<String, BggError> {
        let file = SettingsFile {
            bgg: BggSection {
                base_url: Some(self.base_url.clone()),
                api_token: self.api_token.as_ref().map(|_| "********".to_string()),
                request_interval_ms: Some(self.request_interval_ms),
                retry_delay_ms: Some(self.retry_delay_ms),
            },
            cache: CacheSection {
                dir: self.cache_dir.clone(),
                collection_max_age_hours: Some(self.collection_max_age_hours),
                game_max_age_hours: Some(self.game_max_age_hours),
            },
            census: CensusSection {
                known_users: Some(self.known_users.clone()),
                pending_retries: Some(self.pending_retries),
                pending_delay_secs: Some(self.pending_delay_secs),
            },
        };
        toml::to_string_pretty(&file)
            .map_err(|e| BggError::config(format!("Failed to serialize settings: {e}")))
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
