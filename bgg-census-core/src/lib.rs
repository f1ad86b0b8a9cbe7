//! Data model and pure transforms for board game collection census.
//!
//! Nothing in this crate touches the network or the filesystem: parsing of
//! upstream responses lives in `bgg-census-client` and persistence in
//! `bgg-census-cache`. What remains here is the shape of the data and the
//! rules applied to it (normalization, detail resolution, combining).

pub mod collection;
pub mod combine;
pub mod detail;
pub mod game;
pub mod normalize;

pub use collection::{CollectionGame, CollectionRecord, CollectionStatus, GameSummary, Owner};
pub use combine::{Combined, SkippedSource, combine};
pub use detail::{MORE_MARKER, DESCRIPTION_LIMIT, resolve};
pub use game::{
    Expansion, FALLBACK_IMAGE_URL, GameRecord, PollBucket, PollVote, RawThing, SearchResult,
    SuggestedPlayerCount,
};
pub use normalize::{clean_text, normalize};
