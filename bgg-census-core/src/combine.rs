//! Merging several collections into one view of who owns what.
//!
//! Games are deduplicated by normalized name. The first collection seeds the
//! result; later collections either add new games or append their owners to an
//! existing game's `owned_by`. A source without an owner is skipped as a
//! whole; a game whose name normalizes to nothing is skipped on its own. Both
//! are reported.
//!
//! Owner names are compared case-insensitively, matching how the catalog
//! treats usernames. The first spelling seen is kept.

use std::collections::HashMap;

use crate::collection::{CollectionGame, CollectionRecord, Owner};

/// A source collection, or one of its games, left out of a combined result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    pub owner: String,
    pub reason: String,
}

impl std::fmt::Display for SkippedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.owner, self.reason)
    }
}

/// Result of [`combine`]: the merged collection plus every skipped source.
#[derive(Debug, Clone)]
pub struct Combined {
    pub collection: CollectionRecord,
    pub skipped: Vec<SkippedSource>,
}

/// Combine collections in order. Ownership order in each game's `owned_by`
/// follows input order.
pub fn combine(collections: Vec<CollectionRecord>) -> Combined {
    let mut merger = Merger::default();
    let mut skipped = Vec::new();

    for source in collections {
        match validate(&source) {
            Ok(()) => skipped.extend(merger.merge(source)),
            Err(reason) => {
                let owner = source.owner.to_string();
                log::warn!("Skipping collection '{owner}' while combining: {reason}");
                skipped.push(SkippedSource { owner, reason });
            }
        }
    }

    Combined {
        collection: merger.finish(),
        skipped,
    }
}

#[derive(Default)]
struct Merger {
    owners: Vec<String>,
    games: Vec<CollectionGame>,
    by_name: HashMap<String, usize>,
}

impl Merger {
    /// Merge one source, returning the games that had to be left out.
    fn merge(&mut self, source: CollectionRecord) -> Vec<SkippedSource> {
        let mut skipped = Vec::new();
        let contributors: Vec<String> = source
            .owner
            .names()
            .into_iter()
            .map(|name| self.canonical_owner(name))
            .collect();

        for mut game in source.games {
            if game.name.trim().is_empty() {
                let owner = contributors.join(", ");
                let reason = format!(
                    "game {} ('{}') has no normalized name",
                    game.object_id, game.label
                );
                log::warn!("Skipping a game from '{owner}' while combining: {reason}");
                skipped.push(SkippedSource { owner, reason });
                continue;
            }

            // A game without owners belongs to whoever contributed the source
            let owners: Vec<String> = if game.owned_by.is_empty() {
                contributors.clone()
            } else {
                std::mem::take(&mut game.owned_by)
                    .iter()
                    .map(|name| self.canonical_owner(name))
                    .collect()
            };

            match self.by_name.get(&game.name).copied() {
                Some(i) => {
                    for owner in &owners {
                        push_unique(&mut self.games[i].owned_by, owner);
                    }
                }
                None => {
                    for owner in &owners {
                        push_unique(&mut game.owned_by, owner);
                    }
                    self.by_name.insert(game.name.clone(), self.games.len());
                    self.games.push(game);
                }
            }
        }
        skipped
    }

    /// The spelling first seen for this owner, registering it if new.
    fn canonical_owner(&mut self, name: &str) -> String {
        if let Some(known) = self.owners.iter().find(|o| same_owner(o, name)) {
            return known.clone();
        }
        self.owners.push(name.to_string());
        name.to_string()
    }

    fn finish(self) -> CollectionRecord {
        CollectionRecord::from_parts(Owner::Combined(self.owners), self.games)
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| same_owner(v, value)) {
        list.push(value.to_string());
    }
}

/// Usernames are case-insensitive upstream.
fn same_owner(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn validate(source: &CollectionRecord) -> Result<(), String> {
    let names = source.owner.names();
    if names.is_empty() || names.iter().any(|n| n.trim().is_empty()) {
        return Err("collection has no owner".to_string());
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/combine_tests.rs"]
mod tests;
