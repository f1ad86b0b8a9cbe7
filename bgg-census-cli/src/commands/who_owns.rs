use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use bgg_census_client::{Census, Lookup};

use super::collection::print_skipped;
use super::game::print_game;
use crate::error::CliError;

/// Matches beyond this many are summarized as a count.
const MAX_OTHER_MATCHES: usize = 10;

/// `who-owns <name...>`
pub(crate) async fn run_who_owns(census: &Census, name: &str) -> Result<(), CliError> {
    let answer = census.who_owns(name).await?;
    print_skipped(&answer.skipped);

    match answer.lookup {
        Lookup::Owned {
            game,
            details,
            other_matches,
        } => {
            log::info!(
                "{} is owned by {}",
                details.label.if_supports_color(Stdout, |t| t.bold()),
                game.owned_by.join(", ").if_supports_color(Stdout, |t| t.green())
            );
            log::info!("");
            print_game(&details);

            if !other_matches.is_empty() {
                log::info!("");
                log::info!("Other matches:");
                for other in other_matches.iter().take(MAX_OTHER_MATCHES) {
                    log::info!("  {} ({})", other.name, other.object_id);
                }
                if other_matches.len() > MAX_OTHER_MATCHES {
                    log::info!("  ...and {} more", other_matches.len() - MAX_OTHER_MATCHES);
                }
            }
            Ok(())
        }
        Lookup::Unowned {
            details,
            search_results,
        } => {
            log::info!(
                "Nobody owns {}",
                details.label.if_supports_color(Stdout, |t| t.bold())
            );
            log::info!("");
            print_game(&details);
            if search_results.len() > 1 {
                log::info!("");
                log::info!(
                    "{}",
                    format!("{} search results; showing the newest.", search_results.len())
                        .if_supports_color(Stdout, |t| t.dimmed())
                );
            }
            Ok(())
        }
        Lookup::NotFound => Err(CliError::not_found(format!(
            "no game matching '{}'",
            answer.query
        ))),
    }
}
