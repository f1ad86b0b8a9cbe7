use super::*;
use crate::game::{Expansion, PollVote};

fn bucket(player_count: &str, best: u32, recommended: u32, not_recommended: u32) -> PollBucket {
    PollBucket {
        player_count: player_count.to_string(),
        votes: vec![
            PollVote {
                value: "Best".to_string(),
                votes: best,
            },
            PollVote {
                value: "Recommended".to_string(),
                votes: recommended,
            },
            PollVote {
                value: "Not Recommended".to_string(),
                votes: not_recommended,
            },
        ],
    }
}

fn catan() -> RawThing {
    RawThing {
        object_id: "13".to_string(),
        kind: "boardgame".to_string(),
        primary_name: "CATAN".to_string(),
        description: "Trade, build &amp; settle.&#10;&#10;Roll the dice.".to_string(),
        year_published: Some(1995),
        min_players: 3,
        max_players: 4,
        min_playtime: 60,
        max_playtime: 120,
        image_url: "https://example.com/catan.jpg".to_string(),
        thumbnail_url: "https://example.com/catan_t.jpg".to_string(),
        average_rating: 7.0891,
        average_weight: 2.2857,
        player_count_poll: vec![
            bucket("1", 0, 2, 150),
            bucket("2", 5, 40, 120),
            bucket("3", 300, 200, 10),
            bucket("4", 400, 150, 5),
            bucket("4+", 10, 30, 200),
        ],
        expansions: vec![Expansion {
            object_id: "325".to_string(),
            label: "Catan: Seafarers".to_string(),
        }],
    }
}

#[test]
fn player_count_display_single_value() {
    assert_eq!(player_count_display(4, 4), "4");
}

#[test]
fn player_count_display_range() {
    assert_eq!(player_count_display(2, 4), "2 - 4");
}

#[test]
fn play_time_display_formats_range() {
    assert_eq!(play_time_display(30, 60), "30 - 60 Min");
}

#[test]
fn truncate_long_description() {
    let description = "a".repeat(500);
    let short = truncate_description(&description);
    assert_eq!(short.len(), DESCRIPTION_LIMIT + MORE_MARKER.len());
    assert!(short.starts_with(&"a".repeat(400)));
    assert!(short.ends_with(MORE_MARKER));
}

#[test]
fn truncate_short_description_passes_through() {
    let description = "b".repeat(300);
    assert_eq!(truncate_description(&description), description);
}

#[test]
fn truncate_exactly_at_limit_passes_through() {
    let description = "c".repeat(DESCRIPTION_LIMIT);
    assert_eq!(truncate_description(&description), description);
}

#[test]
fn truncate_counts_characters_not_bytes() {
    let description = "é".repeat(401);
    let short = truncate_description(&description);
    assert_eq!(short.chars().count(), DESCRIPTION_LIMIT + MORE_MARKER.len());
}

#[test]
fn majority_vote_picks_highest() {
    let result = majority_vote(&bucket("3", 300, 200, 10));
    assert_eq!(result.best_recommendation.as_deref(), Some("Best"));
    assert_eq!(result.vote_count, 300);
}

#[test]
fn majority_vote_tie_keeps_first() {
    let result = majority_vote(&bucket("2", 10, 10, 3));
    assert_eq!(result.best_recommendation.as_deref(), Some("Best"));
}

#[test]
fn majority_vote_without_votes() {
    let result = majority_vote(&bucket("7", 0, 0, 0));
    assert_eq!(result.best_recommendation, None);
    assert_eq!(result.vote_count, 0);
}

#[test]
fn resolve_computes_display_fields() {
    let game = resolve(catan());
    assert_eq!(game.label, "CATAN");
    assert_eq!(game.normalized_name, "catan");
    assert_eq!(game.player_count_display, "3 - 4");
    assert_eq!(game.best_player_count, "3/4");
    assert_eq!(game.player_count_details, "3 - 4, Best: 3/4");
    assert_eq!(game.play_time_display, "60 - 120 Min");
    assert_eq!(game.rating_display, "7.1");
    assert_eq!(game.description, "Trade, build & settle. Roll the dice.");
    assert_eq!(game.description_short, game.description);
    assert_eq!(game.suggested_player_counts.len(), 5);
    assert_eq!(game.expansions.len(), 1);
    assert_eq!(game.title(), "CATAN (1995)");
}

#[test]
fn resolve_raises_unknown_maximum_to_minimum() {
    let mut raw = catan();
    raw.min_players = 2;
    raw.max_players = 0;
    raw.max_playtime = 0;
    let game = resolve(raw);
    assert_eq!(game.max_players, 2);
    assert_eq!(game.player_count_display, "2");
    assert_eq!(game.max_playtime, game.min_playtime);
}

#[test]
fn resolve_without_best_votes_has_empty_best_count() {
    let mut raw = catan();
    raw.player_count_poll = vec![bucket("2", 0, 10, 1)];
    let game = resolve(raw);
    assert_eq!(game.best_player_count, "");
    assert_eq!(game.player_count_details, "3 - 4, Best: ");
}
