use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use bgg_census_client::Census;
use bgg_census_core::{CollectionRecord, SkippedSource};

use crate::error::CliError;

fn print_collection(collection: &CollectionRecord, show_owners: bool) {
    log::info!(
        "{} owns {} game(s)",
        collection.owner.if_supports_color(Stdout, |t| t.bold()),
        collection.total_games()
    );
    log::info!("");

    let mut games: Vec<_> = collection.games.iter().collect();
    games.sort_by(|a, b| a.name.cmp(&b.name));
    for game in games {
        let year = game
            .year_published
            .as_deref()
            .map(|y| format!(" ({y})"))
            .unwrap_or_default();
        if show_owners {
            log::info!(
                "  {}{}  {}",
                game.label,
                year,
                game.owned_by.join(", ").if_supports_color(Stdout, |t| t.cyan())
            );
        } else {
            log::info!("  {}{}", game.label, year);
        }
    }
}

pub(crate) fn print_skipped(skipped: &[SkippedSource]) {
    for source in skipped {
        log::warn!(
            "{} Skipped {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            source
        );
    }
}

/// `collection <user>`
pub(crate) async fn run_collection(census: &Census, username: &str) -> Result<(), CliError> {
    let collection = census.collection(username).await?;
    print_collection(&collection, false);
    Ok(())
}

/// `refresh <user>`
pub(crate) async fn run_refresh(census: &Census, username: &str) -> Result<(), CliError> {
    let collection = census.refresh_collection(username).await?;
    log::info!(
        "{} Refreshed {}: {} game(s)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        username.if_supports_color(Stdout, |t| t.bold()),
        collection.total_games()
    );
    Ok(())
}

/// `combine <users...>`
pub(crate) async fn run_combine(census: &Census, usernames: &[String]) -> Result<(), CliError> {
    let combined = census.combine_collections(usernames).await;
    print_collection(&combined.collection, true);
    print_skipped(&combined.skipped);
    Ok(())
}

/// `known`
pub(crate) async fn run_known(census: &Census) -> Result<(), CliError> {
    if census.known_users().is_empty() {
        log::info!(
            "{}",
            "No known users configured.".if_supports_color(Stdout, |t| t.dimmed())
        );
        log::info!("Add [census] known_users to the settings file, or pass --users.");
        return Ok(());
    }

    for (username, result) in census.known_collections().await {
        match result {
            Ok(count) => log::info!(
                "  {} {} game(s)",
                username.if_supports_color(Stdout, |t| t.bold()),
                count
            ),
            Err(e) => log::warn!(
                "{} {}: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                username,
                e
            ),
        }
    }
    Ok(())
}
