use std::sync::Arc;

use reqwest::StatusCode;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use bgg_census_core::{RawThing, SearchResult};

use crate::error::BggError;
use crate::xml::{self, RawCollection};

pub const DEFAULT_BASE_URL: &str = "https://boardgamegeek.com/xmlapi2";
const USER_AGENT: &str = concat!("bgg-census/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`BggClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub api_token: Option<String>,
    /// Minimum spacing between two requests.
    pub request_interval: Duration,
    /// Fixed wait before retrying a rate-limited request.
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            request_interval: Duration::from_millis(1200),
            retry_delay: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Outcome of a request that upstream may answer asynchronously.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Ready(T),
    /// Upstream accepted the request (HTTP 202) but the data is not ready yet.
    Pending,
}

impl<T> Fetch<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Fetch::Pending)
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Fetch::Ready(value) => Some(value),
            Fetch::Pending => None,
        }
    }
}

/// HTTP client for the BoardGameGeek XML API2 with request spacing.
///
/// Clones share the same connection pool and rate limiter.
#[derive(Clone)]
pub struct BggClient {
    http: reqwest::Client,
    config: ClientConfig,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl BggClient {
    pub fn new(config: ClientConfig) -> Result<Self, BggError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            config,
            last_request: Arc::new(Mutex::new(None)),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Search by name. An exact search runs first and, when it matches more
    /// than once, only the first hit is kept. With no exact hit the query is
    /// repeated as a fuzzy search.
    pub async fn search(&self, query: &str, kind: &str) -> Result<Vec<SearchResult>, BggError> {
        let mut exact = self.search_once(query, kind, true).await?;
        if !exact.is_empty() {
            exact.truncate(1);
            return Ok(exact);
        }

        log::debug!("No exact match for '{query}', trying a fuzzy search");
        self.search_once(query, kind, false).await
    }

    async fn search_once(
        &self,
        query: &str,
        kind: &str,
        exact: bool,
    ) -> Result<Vec<SearchResult>, BggError> {
        let mut params = vec![("query", query), ("type", kind)];
        if exact {
            params.push(("exact", "1"));
        }

        let (status, text) = self.get("search", &params).await?;
        if !status.is_success() {
            return Err(BggError::Http {
                status: status.as_u16(),
                body: text,
            });
        }
        xml::parse_search(&text)
    }

    /// Request a user's collection. Upstream queues collection exports and
    /// answers 202 until one is ready; that surfaces as [`Fetch::Pending`].
    pub async fn fetch_collection(
        &self,
        username: &str,
        owned_only: bool,
    ) -> Result<Fetch<RawCollection>, BggError> {
        let mut params = vec![("username", username)];
        if owned_only {
            params.push(("own", "1"));
        }

        let (status, text) = self.get("collection", &params).await?;
        match status {
            StatusCode::OK => Ok(Fetch::Ready(xml::parse_collection(&text)?)),
            StatusCode::ACCEPTED => {
                log::debug!("Collection for '{username}' is queued upstream");
                Ok(Fetch::Pending)
            }
            _ => Err(BggError::CollectionError {
                status: status.as_u16(),
                body: text,
            }),
        }
    }

    /// Fetch a single thing with statistics. A 429 is retried once after
    /// `retry_delay`.
    pub async fn fetch_thing(&self, object_id: &str) -> Result<RawThing, BggError> {
        let params = [("id", object_id), ("stats", "1")];

        let (mut status, mut text) = self.get("thing", &params).await?;
        if status == StatusCode::TOO_MANY_REQUESTS {
            log::warn!(
                "Rate limited fetching thing {object_id}, retrying in {:?}",
                self.config.retry_delay
            );
            tokio::time::sleep(self.config.retry_delay).await;
            (status, text) = self.get("thing", &params).await?;
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(BggError::RateLimited);
            }
        }

        if !status.is_success() {
            return Err(BggError::Http {
                status: status.as_u16(),
                body: text,
            });
        }
        xml::parse_thing(&text)
    }

    async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<(StatusCode, String), BggError> {
        self.rate_limit().await;

        let url = format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'));
        let mut request = self.http.get(&url).query(params);
        if let Some(ref token) = self.config.api_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        log::debug!("GET {endpoint} {params:?} -> {status}");
        Ok((status, text))
    }

    /// Wait until at least `request_interval` has passed since the previous
    /// request.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.config.request_interval {
                tokio::time::sleep(self.config.request_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
