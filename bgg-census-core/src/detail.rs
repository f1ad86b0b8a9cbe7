//! Game detail resolution.
//!
//! Turns a parsed [`RawThing`] into a [`GameRecord`], computing the majority
//! vote for each player-count bucket and the display strings shown to users.
//! Everything here is a pure function of its input.

use crate::game::{GameRecord, PollBucket, RawThing, SuggestedPlayerCount};
use crate::normalize::{clean_text, normalize};

/// Descriptions longer than this many characters are shortened.
pub const DESCRIPTION_LIMIT: usize = 400;

/// Appended to a shortened description.
pub const MORE_MARKER: &str = "...[more]";

const BEST: &str = "Best";

/// Build a [`GameRecord`] from a parsed thing item.
pub fn resolve(raw: RawThing) -> GameRecord {
    let label = normalize(&raw.primary_name, false);
    let normalized_name = normalize(&label, true);
    let description = clean_text(&raw.description);
    let description_short = truncate_description(&description);

    // Upstream reports 0 for an unknown maximum
    let min_players = raw.min_players;
    let max_players = raw.max_players.max(min_players);
    let min_playtime = raw.min_playtime;
    let max_playtime = raw.max_playtime.max(min_playtime);

    let suggested_player_counts: Vec<SuggestedPlayerCount> =
        raw.player_count_poll.iter().map(majority_vote).collect();

    let player_count_display = player_count_display(min_players, max_players);
    let best_player_count = best_player_count(&suggested_player_counts);
    let player_count_details = format!("{player_count_display}, Best: {best_player_count}");

    GameRecord {
        object_id: raw.object_id,
        label,
        normalized_name,
        year_published: raw.year_published,
        min_players,
        max_players,
        min_playtime,
        max_playtime,
        average_rating: raw.average_rating,
        average_weight: raw.average_weight,
        description,
        description_short,
        image_url: raw.image_url,
        thumbnail_url: raw.thumbnail_url,
        suggested_player_counts,
        expansions: raw.expansions,
        player_count_display,
        best_player_count,
        play_time_display: play_time_display(min_playtime, max_playtime),
        rating_display: format!("{:.1}", raw.average_rating),
        player_count_details,
    }
}

/// Pick the recommendation with the most votes. Ties keep the first value
/// seen; a bucket where nobody voted has no recommendation.
pub fn majority_vote(bucket: &PollBucket) -> SuggestedPlayerCount {
    let mut best_recommendation = None;
    let mut vote_count = 0;

    for vote in &bucket.votes {
        if vote.votes > vote_count {
            best_recommendation = Some(vote.value.clone());
            vote_count = vote.votes;
        }
    }

    SuggestedPlayerCount {
        player_count: bucket.player_count.clone(),
        best_recommendation,
        vote_count,
    }
}

/// "4" when both bounds agree, "2 - 4" otherwise.
pub fn player_count_display(min: u32, max: u32) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{min} - {max}")
    }
}

/// Slash-joined player counts whose majority vote is "Best" (e.g., "3/4").
pub fn best_player_count(counts: &[SuggestedPlayerCount]) -> String {
    counts
        .iter()
        .filter(|c| c.best_recommendation.as_deref() == Some(BEST))
        .map(|c| c.player_count.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn play_time_display(min: u32, max: u32) -> String {
    format!("{min} - {max} Min")
}

/// Keep the first [`DESCRIPTION_LIMIT`] characters, appending [`MORE_MARKER`]
/// if anything was cut.
pub fn truncate_description(description: &str) -> String {
    match description.char_indices().nth(DESCRIPTION_LIMIT) {
        Some((cut, _)) => format!("{}{}", &description[..cut], MORE_MARKER),
        None => description.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
