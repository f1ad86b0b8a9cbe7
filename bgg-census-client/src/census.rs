//! Cache-through access to games and collections.
//!
//! [`Census`] ties the upstream client to a [`CacheStore`]: every lookup is
//! answered from the cache while the entry is younger than the category's
//! max age, and refetched otherwise.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::Duration;

use bgg_census_cache::{CacheCategory, CachePolicy, CacheStore, FileCacheStore};
use bgg_census_core::{
    CollectionGame, CollectionRecord, Combined, GameRecord, GameSummary, SearchResult,
    SkippedSource, combine, normalize, resolve,
};

use crate::client::{BggClient, Fetch};
use crate::error::BggError;
use crate::settings::Settings;

const BOARDGAME: &str = "boardgame";

/// How long to keep asking for a collection that upstream is still preparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPolicy {
    /// Extra attempts after the first 202.
    pub retries: u32,
    pub delay: Duration,
}

impl Default for PendingPolicy {
    fn default() -> Self {
        Self {
            retries: 1,
            delay: Duration::from_secs(5),
        }
    }
}

/// Answer to "who owns this game?".
#[derive(Debug, Clone)]
pub enum Lookup {
    /// At least one known user owns a matching game. `game` is the first
    /// match; `other_matches` lists the rest.
    Owned {
        game: CollectionGame,
        details: GameRecord,
        other_matches: Vec<GameSummary>,
    },
    /// Nobody owns it, but upstream knows the game.
    Unowned {
        details: GameRecord,
        search_results: Vec<SearchResult>,
    },
    NotFound,
}

/// Result of [`Census::who_owns`], including collections that could not be
/// consulted.
#[derive(Debug, Clone)]
pub struct WhoOwns {
    pub query: String,
    pub lookup: Lookup,
    pub skipped: Vec<SkippedSource>,
}

pub struct Census {
    store: Arc<dyn CacheStore>,
    client: BggClient,
    policy: CachePolicy,
    pending: PendingPolicy,
    known_users: Vec<String>,
}

impl Census {
    pub fn new(store: Arc<dyn CacheStore>, client: BggClient) -> Self {
        Self {
            store,
            client,
            policy: CachePolicy::default(),
            pending: PendingPolicy::default(),
            known_users: Vec::new(),
        }
    }

    /// Build a census backed by the file cache described by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, BggError> {
        let store = FileCacheStore::new(settings.resolved_cache_dir()?);
        let client = BggClient::new(settings.client_config())?;
        Ok(Self::new(Arc::new(store), client)
            .with_policy(settings.cache_policy())
            .with_pending_policy(settings.pending_policy())
            .with_known_users(settings.known_users.clone()))
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_pending_policy(mut self, pending: PendingPolicy) -> Self {
        self.pending = pending;
        self
    }

    pub fn with_known_users(mut self, users: Vec<String>) -> Self {
        self.known_users = users;
        self
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn client(&self) -> &BggClient {
        &self.client
    }

    pub fn known_users(&self) -> &[String] {
        &self.known_users
    }

    /// Resolved details for one game, from the cache when fresh.
    pub async fn game_detail(&self, object_id: &str) -> Result<GameRecord, BggError> {
        if let Some(game) = self.cached::<GameRecord>(CacheCategory::Game, object_id)? {
            return Ok(game);
        }

        let raw = self.client.fetch_thing(object_id).await?;
        let game = resolve(raw);
        self.store_payload(CacheCategory::Game, object_id, &game)?;
        Ok(game)
    }

    /// A user's owned games, from the cache when fresh.
    pub async fn collection(&self, username: &str) -> Result<CollectionRecord, BggError> {
        let key = collection_key(username);
        let cached = self.cached::<CollectionRecord>(CacheCategory::Collection, &key)?;
        if let Some(collection) = cached {
            return Ok(collection);
        }
        self.fetch_collection(username).await
    }

    /// Drop any cached copy of a user's collection and fetch it again.
    pub async fn refresh_collection(&self, username: &str) -> Result<CollectionRecord, BggError> {
        if self.store.delete(CacheCategory::Collection, &collection_key(username))? {
            log::info!("Dropped cached collection for '{username}'");
        }
        self.fetch_collection(username).await
    }

    async fn fetch_collection(&self, username: &str) -> Result<CollectionRecord, BggError> {
        let mut attempts = 0;
        let raw = loop {
            match self.client.fetch_collection(username, true).await? {
                Fetch::Ready(raw) => break raw,
                Fetch::Pending if attempts < self.pending.retries => {
                    attempts += 1;
                    log::info!(
                        "Collection for '{username}' is being prepared, retrying in {:?} ({attempts}/{})",
                        self.pending.delay,
                        self.pending.retries
                    );
                    tokio::time::sleep(self.pending.delay).await;
                }
                Fetch::Pending => {
                    return Err(BggError::CollectionPending {
                        username: username.to_string(),
                    });
                }
            }
        };

        let collection = CollectionRecord::single(username, raw.games);
        log::info!(
            "Fetched collection for '{username}': {} games",
            collection.total_games()
        );
        self.store_payload(CacheCategory::Collection, &collection_key(username), &collection)?;
        Ok(collection)
    }

    /// Fetch every user's collection concurrently and combine them in the
    /// order given. Users whose collection could not be fetched are reported
    /// in `skipped`.
    pub async fn combine_collections(&self, usernames: &[String]) -> Combined {
        let results = join_all(usernames.iter().map(|u| self.collection(u))).await;

        let mut collections = Vec::with_capacity(results.len());
        let mut failed = Vec::new();
        for (username, result) in usernames.iter().zip(results) {
            match result {
                Ok(collection) => collections.push(collection),
                Err(e) => {
                    log::warn!("Skipping collection '{username}': {e}");
                    failed.push(SkippedSource {
                        owner: username.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut combined = combine(collections);
        failed.append(&mut combined.skipped);
        combined.skipped = failed;
        combined
    }

    /// Find which known users own a game matching `query`.
    ///
    /// Falls back to an upstream search when nobody owns a match, picking the
    /// newest (highest id) result.
    pub async fn who_owns(&self, query: &str) -> Result<WhoOwns, BggError> {
        let key = normalize(query, true);
        let Combined {
            collection,
            skipped,
        } = self.combine_collections(&self.known_users).await;

        let mut matches = collection.search(&key).into_iter();
        if let Some(first) = matches.next() {
            let details = self.game_detail(&first.object_id).await?;
            let lookup = Lookup::Owned {
                game: first.clone(),
                details,
                other_matches: matches.map(CollectionGame::summary).collect(),
            };
            return Ok(WhoOwns {
                query: key,
                lookup,
                skipped,
            });
        }

        let search_results = self.client.search(query, BOARDGAME).await?;
        let newest = search_results
            .iter()
            .max_by_key(|r| r.numeric_id().unwrap_or(0))
            .map(|r| r.object_id.clone());
        let lookup = match newest {
            Some(object_id) => Lookup::Unowned {
                details: self.game_detail(&object_id).await?,
                search_results,
            },
            None => Lookup::NotFound,
        };
        Ok(WhoOwns {
            query: key,
            lookup,
            skipped,
        })
    }

    /// Game count per known user, or the error that prevented fetching it.
    pub async fn known_collections(&self) -> Vec<(String, Result<usize, BggError>)> {
        let results = join_all(self.known_users.iter().map(|u| self.collection(u))).await;
        self.known_users
            .iter()
            .cloned()
            .zip(results.into_iter().map(|r| r.map(|c| c.total_games())))
            .collect()
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, BggError> {
        self.client.search(query, BOARDGAME).await
    }

    /// Read and decode a cached payload. A payload that no longer decodes is
    /// deleted and reported as a miss.
    fn cached<T: DeserializeOwned>(
        &self,
        category: CacheCategory,
        key: &str,
    ) -> Result<Option<T>, BggError> {
        let Some(entry) = self.store.get(category, key, self.policy.max_age(category))? else {
            log::debug!("Cache miss for {category} '{key}'");
            return Ok(None);
        };

        match serde_json::from_value(entry.payload) {
            Ok(value) => {
                log::debug!("Cache hit for {category} '{key}'");
                Ok(Some(value))
            }
            Err(e) => {
                log::warn!("Discarding unreadable {category} cache for '{key}': {e}");
                self.store.delete(category, key)?;
                Ok(None)
            }
        }
    }

    fn store_payload<T: Serialize>(
        &self,
        category: CacheCategory,
        key: &str,
        value: &T,
    ) -> Result<(), BggError> {
        let payload = serde_json::to_value(value)?;
        self.store.put(category, key, payload)?;
        Ok(())
    }
}

/// Usernames are case-insensitive upstream, so `Alice` and `alice` share one
/// cache entry.
fn collection_key(username: &str) -> String {
    username.trim().to_lowercase()
}
