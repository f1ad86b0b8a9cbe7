use serde::{Deserialize, Serialize};

/// Placeholder used when an item carries no `<image>` or `<thumbnail>`.
pub const FALLBACK_IMAGE_URL: &str = "https://boardgamegeek.com/favicon.ico";

/// A single hit from the upstream search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub object_id: String,
    /// Upstream item type (e.g., "boardgame", "boardgameexpansion").
    pub kind: String,
    pub name: String,
}

impl SearchResult {
    /// Numeric object id, if the id is numeric. Newer entries have larger ids.
    pub fn numeric_id(&self) -> Option<u64> {
        self.object_id.parse().ok()
    }
}

/// An expansion linked from a base game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    pub object_id: String,
    pub label: String,
}

/// One vote tally inside a player-count bucket ("Best", "Recommended", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollVote {
    pub value: String,
    pub votes: u32,
}

/// All tallies recorded for a single player count in the
/// `suggested_numplayers` poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollBucket {
    /// Player count as upstream reports it; may be "4+" for the open bucket.
    pub player_count: String,
    pub votes: Vec<PollVote>,
}

/// A "thing" item as parsed from XML, before any derived fields are computed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawThing {
    pub object_id: String,
    pub kind: String,
    pub primary_name: String,
    pub description: String,
    pub year_published: Option<i32>,
    pub min_players: u32,
    pub max_players: u32,
    pub min_playtime: u32,
    pub max_playtime: u32,
    pub image_url: String,
    pub thumbnail_url: String,
    pub average_rating: f64,
    pub average_weight: f64,
    pub player_count_poll: Vec<PollBucket>,
    pub expansions: Vec<Expansion>,
}

/// Majority-vote outcome for one player count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedPlayerCount {
    pub player_count: String,
    /// `None` when nobody voted for this bucket.
    pub best_recommendation: Option<String>,
    pub vote_count: u32,
}

/// Fully resolved game details. Built by [`crate::resolve`] and cached by
/// object id; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub object_id: String,
    pub label: String,
    pub normalized_name: String,
    pub year_published: Option<i32>,
    pub min_players: u32,
    pub max_players: u32,
    pub min_playtime: u32,
    pub max_playtime: u32,
    pub average_rating: f64,
    pub average_weight: f64,
    pub description: String,
    pub description_short: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub suggested_player_counts: Vec<SuggestedPlayerCount>,
    pub expansions: Vec<Expansion>,

    pub player_count_display: String,
    pub best_player_count: String,
    pub play_time_display: String,
    pub rating_display: String,
    pub player_count_details: String,
}

impl GameRecord {
    /// Title with the publication year appended when known.
    pub fn title(&self) -> String {
        match self.year_published {
            Some(year) => format!("{} ({})", self.label, year),
            None => self.label.clone(),
        }
    }

    /// Public catalog page for this game.
    pub fn url(&self) -> String {
        format!("https://boardgamegeek.com/boardgame/{}", self.object_id)
    }
}
