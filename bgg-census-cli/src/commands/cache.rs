use chrono::Utc;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use bgg_census_cache::{CacheCategory, CacheStore, FileCacheStore};
use bgg_census_client::Settings;

use super::format_bytes;
use crate::error::CliError;

fn open_store(settings: &Settings) -> Result<FileCacheStore, CliError> {
    Ok(FileCacheStore::new(settings.resolved_cache_dir()?))
}

/// List cached entries.
pub(crate) fn run_cache_list(settings: &Settings) -> Result<(), CliError> {
    let store = open_store(settings)?;
    let entries = store.list()?;
    if entries.is_empty() {
        log::info!(
            "{}",
            "Cache is empty.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }

    log::info!(
        "{} {}",
        "Cache:".if_supports_color(Stdout, |t| t.bold()),
        store.root().display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!("");

    let policy = settings.cache_policy();
    let now = Utc::now();
    let mut total_size = 0u64;
    for entry in &entries {
        total_size += entry.size_bytes;
        let age = now - entry.created_at;
        let stale = age > policy.max_age(entry.category);
        log::info!(
            "  {:<10} {:<24} {:>9}  {}h old{}",
            entry.category.as_str(),
            entry.key.if_supports_color(Stdout, |t| t.bold()),
            format_bytes(entry.size_bytes),
            age.num_hours(),
            if stale { " (stale)" } else { "" },
        );
    }
    log::info!("");
    log::info!(
        "Total: {} entries, {}",
        entries.len(),
        format_bytes(total_size)
    );
    Ok(())
}

/// Remove cached entries, optionally limited to one category.
pub(crate) fn run_cache_clear(
    settings: &Settings,
    category: Option<CacheCategory>,
) -> Result<(), CliError> {
    let store = open_store(settings)?;
    let removed = store.clear(category)?;
    let scope = category.map(|c| c.to_string()).unwrap_or_else(|| "all".to_string());
    log::info!(
        "{} Cache cleared ({}: {} entries removed)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        scope,
        removed,
    );
    Ok(())
}
