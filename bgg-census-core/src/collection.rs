use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// Who a collection belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Owner {
    /// A single user's collection as fetched from upstream.
    Single(String),
    /// The owners that contributed to a combined collection, in merge order.
    Combined(Vec<String>),
}

impl Owner {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Owner::Single(name) => vec![name.as_str()],
            Owner::Combined(names) => names.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_combined(&self) -> bool {
        matches!(self, Owner::Combined(_))
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Owner::Single(name) => write!(f, "{name}"),
            Owner::Combined(names) => write!(f, "{}", names.join(", ")),
        }
    }
}

/// Per-user status flags attached to a collection item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStatus {
    pub own: bool,
    pub prev_owned: bool,
    pub for_trade: bool,
    pub want: bool,
    pub want_to_play: bool,
    pub want_to_buy: bool,
    pub wishlist: bool,
    pub preordered: bool,
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// A game as it appears in a collection, annotated with who owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionGame {
    pub object_id: String,
    pub subtype: String,
    /// Display name.
    pub label: String,
    /// Normalized (slug) name; the dedup key when combining.
    pub name: String,
    #[serde(default)]
    pub year_published: Option<String>,
    pub image_url: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub num_plays: u32,
    #[serde(default)]
    pub status: Option<CollectionStatus>,
    #[serde(default)]
    pub owned_by: Vec<String>,
}

impl CollectionGame {
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            name: self.name.clone(),
            object_id: self.object_id.clone(),
        }
    }
}

/// A `(name, object_id)` pair. Sorting these as a unit keeps names and ids in
/// correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub name: String,
    pub object_id: String,
}

/// A single user's collection, or several merged by [`crate::combine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub owner: Owner,
    pub games: Vec<CollectionGame>,
    index: Vec<GameSummary>,
    total_games: usize,
}

impl CollectionRecord {
    /// Build a single-owner collection. Every game's `owned_by` is set to the
    /// owner.
    pub fn single(owner: impl Into<String>, games: Vec<CollectionGame>) -> Self {
        let owner = owner.into();
        let games = games
            .into_iter()
            .map(|mut game| {
                game.owned_by = vec![owner.clone()];
                game
            })
            .collect();
        Self::from_parts(Owner::Single(owner), games)
    }

    /// Build a collection from already-annotated games, computing the index.
    pub fn from_parts(owner: Owner, games: Vec<CollectionGame>) -> Self {
        let mut record = Self {
            owner,
            games,
            index: Vec::new(),
            total_games: 0,
        };
        record.rebuild_index();
        record
    }

    /// Recompute the sorted index and total from `games`.
    pub fn rebuild_index(&mut self) {
        let mut index: Vec<GameSummary> = self.games.iter().map(CollectionGame::summary).collect();
        index.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| compare_object_ids(&a.object_id, &b.object_id))
        });
        self.total_games = index.len();
        self.index = index;
    }

    /// `(name, id)` pairs sorted by name.
    pub fn index(&self) -> &[GameSummary] {
        &self.index
    }

    pub fn total_games(&self) -> usize {
        self.total_games
    }

    /// Normalized names in ascending order.
    pub fn game_name_list(&self) -> Vec<&str> {
        self.index.iter().map(|s| s.name.as_str()).collect()
    }

    /// Object ids in ascending order (numeric ids compare numerically).
    pub fn game_id_list(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.index.iter().map(|s| s.object_id.as_str()).collect();
        ids.sort_by(|a, b| compare_object_ids(a, b));
        ids
    }

    /// Exact lookup by normalized name.
    pub fn find(&self, name: &str) -> Option<&CollectionGame> {
        let key = normalize(name, true);
        self.games.iter().find(|g| g.name == key)
    }

    /// Every game whose normalized name contains `fragment`, sorted by name.
    pub fn search(&self, fragment: &str) -> Vec<&CollectionGame> {
        let key = normalize(fragment, true);
        if key.is_empty() {
            return Vec::new();
        }

        let mut found: Vec<&CollectionGame> =
            self.games.iter().filter(|g| g.name.contains(&key)).collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }
}

/// Order object ids numerically when both parse, lexically otherwise.
pub fn compare_object_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}
