use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use bgg_census_client::{SettingSource, SettingSources, Settings, settings_path};

use crate::error::CliError;

fn mask_value(s: &str) -> String {
    if s.chars().count() <= 2 {
        "****".to_string()
    } else {
        format!("{}****", s.chars().take(2).collect::<String>())
    }
}

/// Show effective settings and where they came from.
pub(crate) fn run_config_show(
    settings: &Settings,
    sources: &SettingSources,
) -> Result<(), CliError> {
    let path = settings_path();

    log::info!(
        "{}",
        "bgg-census Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");
    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");

    let cache_dir = settings
        .resolved_cache_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|e| e.to_string());
    let known_users = if settings.known_users.is_empty() {
        "(none)".to_string()
    } else {
        settings.known_users.join(", ")
    };
    let fields: [(&str, String, &SettingSource); 4] = [
        ("base_url", settings.base_url.clone(), &sources.base_url),
        (
            "api_token",
            settings
                .api_token
                .as_deref()
                .map(mask_value)
                .unwrap_or_else(|| "(not set)".to_string()),
            &sources.api_token,
        ),
        ("cache_dir", cache_dir, &sources.cache_dir),
        ("known_users", known_users, &sources.known_users),
    ];
    for (name, value, source) in &fields {
        log::info!(
            "  {:<12} {} {}",
            name,
            value,
            format!("[{source}]").if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    log::info!("");
    log::info!("{}", "Effective settings:".if_supports_color(Stdout, |t| t.bold()));
    for line in settings.to_toml()?.lines() {
        log::info!("  {line}");
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    println!("{}", settings_path().display());
    Ok(())
}
