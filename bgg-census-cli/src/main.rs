//! bgg-census CLI
//!
//! Command-line interface for looking up board games and who owns them
//! across a group of BoardGameGeek collections.

mod cli_types;
mod commands;
mod error;

use std::io::Write;

use clap::Parser;

use bgg_census_client::{SettingSources, Settings};

use cli_types::{CacheAction, Cli, Commands, ConfigAction};
use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

/// Log records double as user-facing output, so the default format is the
/// bare message. `--verbose` adds timestamps and module paths.
fn init_logging(quiet: bool, verbose: bool) {
    let default_filter = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if !verbose {
        builder.format(|buf, record| match record.level() {
            log::Level::Error | log::Level::Warn => {
                writeln!(buf, "{}: {}", record.level(), record.args())
            }
            _ => writeln!(buf, "{}", record.args()),
        });
    }
    builder.init();
}

/// Settings from file and environment, with command-line flags applied last.
fn load_settings(cli: &Cli) -> Result<(Settings, SettingSources), CliError> {
    let (mut settings, sources) = Settings::load()?;
    if let Some(ref dir) = cli.cache_dir {
        settings.cache_dir = Some(dir.clone());
    }
    if let Some(ref url) = cli.base_url {
        settings.base_url = url.clone();
    }
    if let Some(ref users) = cli.users {
        settings.known_users = users.clone();
    }
    Ok((settings, sources))
}

fn run(cli: Cli) -> Result<(), CliError> {
    let (settings, sources) = load_settings(&cli)?;

    match cli.command {
        Commands::Cache { action } => match action {
            CacheAction::List => commands::cache::run_cache_list(&settings),
            CacheAction::Clear { category } => {
                commands::cache::run_cache_clear(&settings, category)
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&settings, &sources),
            ConfigAction::Path => commands::config::run_config_path(),
        },
        command => {
            let census = bgg_census_client::Census::from_settings(&settings)?;
            let rt = tokio::runtime::Runtime::new()
                .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {e}")))?;

            rt.block_on(async {
                match command {
                    Commands::Game { id } => commands::game::run_game(&census, &id).await,
                    Commands::Collection { username } => {
                        commands::collection::run_collection(&census, &username).await
                    }
                    Commands::Refresh { username } => {
                        commands::collection::run_refresh(&census, &username).await
                    }
                    Commands::Known => commands::collection::run_known(&census).await,
                    Commands::Combine { usernames } => {
                        commands::collection::run_combine(&census, &usernames).await
                    }
                    Commands::WhoOwns { name } => {
                        commands::who_owns::run_who_owns(&census, &name.join(" ")).await
                    }
                    Commands::Search { query } => {
                        commands::game::run_search(&census, &query.join(" ")).await
                    }
                    Commands::Cache { .. } | Commands::Config { .. } => Ok(()),
                }
            })
        }
    }
}
