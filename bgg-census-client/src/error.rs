use bgg_census_cache::CacheError;

/// Errors that can occur while talking to the catalog or caching its answers.
#[derive(Debug, thiserror::Error)]
pub enum BggError {
    /// Upstream is still preparing the collection; try again shortly.
    #[error("{username}'s collection has been requested and is still being prepared by BGG")]
    CollectionPending { username: String },

    #[error("Collection request failed (HTTP {status}): {body}")]
    CollectionError { status: u16, body: String },

    #[error("Rate limited by BGG")]
    RateLimited,

    #[error("Server error (HTTP {status}): {body}")]
    Http { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with an `<errors>` document.
    #[error("BGG API error: {0}")]
    Api(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BggError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the same request may succeed if repeated after a delay.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CollectionPending { .. } | Self::RateLimited)
    }

    /// Whether this error came from reading or decoding the response body.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Xml(_) | Self::XmlAttribute(_))
    }
}
