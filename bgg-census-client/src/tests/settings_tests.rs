use std::collections::HashMap;

use super::*;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |var: &str| map.get(var).cloned()
}

const FILE: &str = r#"
[bgg]
base_url = "http://localhost:9000/xmlapi2"
api_token = "file-token"
request_interval_ms = 500

[cache]
dir = "/var/cache/census"
game_max_age_hours = 48

[census]
known_users = ["alice", "bob"]
pending_retries = 3
"#;

#[test]
fn defaults_without_file_or_env() {
    let (settings, sources) = Settings::resolve(None, env_from(&[]));
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    assert_eq!(settings.collection_max_age_hours, 6);
    assert_eq!(settings.game_max_age_hours, 24);
    assert_eq!(settings.request_interval_ms, 1200);
    assert_eq!(settings.retry_delay_ms, 2000);
    assert_eq!(settings.pending_retries, 1);
    assert_eq!(settings.pending_delay_secs, 5);
    assert!(settings.known_users.is_empty());
    assert_eq!(sources.base_url, SettingSource::Default);
    assert_eq!(sources.api_token, SettingSource::Default);
}

#[test]
fn file_values_apply() {
    let file = SettingsFile::parse(FILE).unwrap();
    let (settings, sources) = Settings::resolve(Some(file), env_from(&[]));

    assert_eq!(settings.base_url, "http://localhost:9000/xmlapi2");
    assert_eq!(settings.api_token.as_deref(), Some("file-token"));
    assert_eq!(settings.cache_dir, Some(PathBuf::from("/var/cache/census")));
    assert_eq!(settings.game_max_age_hours, 48);
    assert_eq!(settings.collection_max_age_hours, 6);
    assert_eq!(settings.known_users, vec!["alice", "bob"]);
    assert_eq!(settings.request_interval_ms, 500);
    assert_eq!(settings.pending_retries, 3);
    assert_eq!(sources.known_users, SettingSource::ConfigFile);
    assert_eq!(sources.cache_dir, SettingSource::ConfigFile);
}

#[test]
fn env_overrides_file() {
    let file = SettingsFile::parse(FILE).unwrap();
    let env = env_from(&[
        (ENV_API_TOKEN, "env-token"),
        (ENV_KNOWN_USERS, " carol, ,dave "),
        (ENV_CACHE_DIR, "/tmp/census"),
    ]);
    let (settings, sources) = Settings::resolve(Some(file), env);

    assert_eq!(settings.api_token.as_deref(), Some("env-token"));
    assert_eq!(settings.known_users, vec!["carol", "dave"]);
    assert_eq!(settings.cache_dir, Some(PathBuf::from("/tmp/census")));
    assert_eq!(settings.base_url, "http://localhost:9000/xmlapi2");
    assert_eq!(sources.api_token, SettingSource::EnvVar(ENV_API_TOKEN));
    assert_eq!(sources.known_users, SettingSource::EnvVar(ENV_KNOWN_USERS));
    assert_eq!(sources.base_url, SettingSource::ConfigFile);
}

#[test]
fn blank_env_value_is_ignored() {
    let (settings, sources) = Settings::resolve(None, env_from(&[(ENV_API_TOKEN, "  ")]));
    assert_eq!(settings.api_token, None);
    assert_eq!(sources.api_token, SettingSource::Default);
}

#[test]
fn invalid_toml_is_config_error() {
    let err = SettingsFile::parse("[bgg\nbase_url = 1").unwrap_err();
    assert!(matches!(err, BggError::Config(_)));
}

#[test]
fn missing_file_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let file = SettingsFile::read(&dir.path().join("settings.toml")).unwrap();
    assert!(file.is_none());
}

#[test]
fn derived_configs() {
    let file = SettingsFile::parse(FILE).unwrap();
    let (settings, _) = Settings::resolve(Some(file), env_from(&[]));

    let client = settings.client_config();
    assert_eq!(client.request_interval, Duration::from_millis(500));
    assert_eq!(client.api_token.as_deref(), Some("file-token"));

    let policy = settings.cache_policy();
    assert_eq!(
        policy.max_age(bgg_census_cache::CacheCategory::Game),
        chrono::TimeDelta::hours(48)
    );

    assert_eq!(settings.pending_policy().retries, 3);
    assert_eq!(
        settings.resolved_cache_dir().unwrap(),
        PathBuf::from("/var/cache/census")
    );
}

#[test]
fn rendered_toml_hides_token() {
    let (settings, _) = Settings::resolve(None, env_from(&[(ENV_API_TOKEN, "secret")]));
    let rendered = settings.to_toml().unwrap();
    assert!(!rendered.contains("secret"));
    assert!(rendered.contains("[cache]"));
    assert!(SettingsFile::parse(&rendered).is_ok());
}
