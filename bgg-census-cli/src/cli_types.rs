//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bgg_census_cache::CacheCategory;

#[derive(Parser)]
#[command(name = "bgg-census")]
#[command(about = "Find out who owns which board games across BoardGameGeek collections", long_about = None)]
pub(crate) struct Cli {
    /// Cache directory (overrides settings and $BGG_CENSUS_CACHE_DIR)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// XML API2 base URL (overrides settings and $BGG_CENSUS_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Usernames to consult instead of the configured known users
    #[arg(short, long, global = true, value_delimiter = ',')]
    pub users: Option<Vec<String>>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Show details for a game by its BGG id
    Game {
        /// BGG object id (e.g., 13)
        id: String,
    },

    /// List the games a user owns
    Collection {
        username: String,
    },

    /// Find which known users own a game
    WhoOwns {
        /// Game name; multiple words are joined
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Search BGG for games by name
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Combine several users' collections and show who owns what
    Combine {
        #[arg(required = true, num_args = 1.., value_delimiter = ',')]
        usernames: Vec<String>,
    },

    /// Drop a user's cached collection and fetch it again
    Refresh {
        username: String,
    },

    /// Show how many games each known user owns
    Known,

    /// Manage cached responses
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Inspect settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum CacheAction {
    /// List cached entries
    List,

    /// Remove cached entries
    Clear {
        /// Only clear one category (collection or game)
        #[arg(long)]
        category: Option<CacheCategory>,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show effective settings and where they came from
    Show,

    /// Print the settings file path
    Path,
}
