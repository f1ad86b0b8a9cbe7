use bgg_census_cache::*;
use chrono::{TimeDelta, Utc};
use serde_json::json;

#[test]
fn round_trip_within_max_age() {
    let store = MemoryCacheStore::new();
    let payload = json!({"label": "Azul"});
    store
        .put(CacheCategory::Game, "230802", payload.clone())
        .unwrap();

    let entry = store
        .get(CacheCategory::Game, "230802", TimeDelta::hours(24))
        .unwrap()
        .unwrap();
    assert_eq!(entry.payload, payload);
}

#[test]
fn stale_entry_is_evicted() {
    let store = MemoryCacheStore::new();
    store
        .insert(CacheEntry::new(
            CacheCategory::Collection,
            "bob",
            json!({}),
            Utc::now() - TimeDelta::hours(10),
        ))
        .unwrap();

    assert!(
        store
            .get(CacheCategory::Collection, "bob", TimeDelta::hours(6))
            .unwrap()
            .is_none()
    );
    assert!(store.is_empty());
}

#[test]
fn insert_replaces_existing_entry() {
    let store = MemoryCacheStore::new();
    store
        .put(CacheCategory::Collection, "bob", json!({"version": 1}))
        .unwrap();
    store
        .put(CacheCategory::Collection, "bob", json!({"version": 2}))
        .unwrap();

    assert_eq!(store.len(), 1);
    let entry = store
        .get(CacheCategory::Collection, "bob", TimeDelta::hours(6))
        .unwrap()
        .unwrap();
    assert_eq!(entry.payload["version"], 2);
}

#[test]
fn delete_and_clear() {
    let store = MemoryCacheStore::new();
    store.put(CacheCategory::Game, "13", json!({})).unwrap();
    store
        .put(CacheCategory::Collection, "alice", json!({}))
        .unwrap();

    assert!(store.delete(CacheCategory::Game, "13").unwrap());
    assert!(!store.delete(CacheCategory::Game, "13").unwrap());
    assert_eq!(store.clear(Some(CacheCategory::Game)).unwrap(), 0);
    assert_eq!(store.clear(None).unwrap(), 1);
}

#[test]
fn policy_defaults() {
    let policy = CachePolicy::default();
    assert_eq!(policy.max_age(CacheCategory::Collection), TimeDelta::hours(6));
    assert_eq!(policy.max_age(CacheCategory::Game), TimeDelta::hours(24));
}

#[test]
fn category_parses_from_str() {
    assert_eq!("games".parse::<CacheCategory>().unwrap(), CacheCategory::Game);
    assert_eq!(
        "Collection".parse::<CacheCategory>().unwrap(),
        CacheCategory::Collection
    );
    assert!("widgets".parse::<CacheCategory>().is_err());
}
