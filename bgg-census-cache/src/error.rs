use std::path::PathBuf;

/// Errors that can occur while reading or writing cache entries.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),

    #[error("Unknown cache category: {0}")]
    UnknownCategory(String),

    #[error("Could not determine cache directory")]
    NoCacheDir,
}

impl CacheError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey(key.into())
    }
}
