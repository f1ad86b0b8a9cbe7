use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use bgg_census_client::Census;
use bgg_census_core::GameRecord;

use crate::error::CliError;

/// Print a game's details card.
pub(crate) fn print_game(game: &GameRecord) {
    log::info!("{}", game.title().if_supports_color(Stdout, |t| t.bold()));
    log::info!("  {}", game.url().if_supports_color(Stdout, |t| t.cyan()));
    log::info!("  Players:  {}", game.player_count_details);
    log::info!("  Time:     {}", game.play_time_display);
    log::info!(
        "  Rating:   {} (weight {:.2})",
        game.rating_display,
        game.average_weight
    );
    if !game.expansions.is_empty() {
        log::info!("  Expansions: {}", game.expansions.len());
    }
    if !game.description_short.is_empty() {
        log::info!("");
        log::info!(
            "  {}",
            game.description_short.if_supports_color(Stdout, |t| t.dimmed())
        );
    }
}

/// `game <id>`
pub(crate) async fn run_game(census: &Census, id: &str) -> Result<(), CliError> {
    let game = census.game_detail(id).await?;
    print_game(&game);
    Ok(())
}

/// `search <query>`
pub(crate) async fn run_search(census: &Census, query: &str) -> Result<(), CliError> {
    let results = census.search(query).await?;
    if results.is_empty() {
        return Err(CliError::not_found(format!("no games match '{query}'")));
    }

    log::info!(
        "{} result(s) for '{}':",
        results.len(),
        query.if_supports_color(Stdout, |t| t.bold())
    );
    for result in &results {
        log::info!(
            "  {:>8}  {} {}",
            result.object_id.if_supports_color(Stdout, |t| t.cyan()),
            result.name,
            format!("({})", result.kind).if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}
