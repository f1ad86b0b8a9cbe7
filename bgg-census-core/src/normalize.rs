//! Text normalization for names coming back from the catalog.
//!
//! Two entry points share the same cleanup pipeline:
//!
//! - [`clean_text`] decodes leftover HTML entities, applies NFKC and collapses
//!   whitespace. Used for free text such as descriptions.
//! - [`normalize`] additionally drops punctuation and, in slug mode, lowercases
//!   the result so it can be used as a stable lookup key.

use std::borrow::Cow;

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use unicode_normalization::UnicodeNormalization;

/// Normalize a name. With `slug` set the result is lowercased and suitable as
/// a lookup key; `normalize(normalize(x, s), s) == normalize(x, s)`.
pub fn normalize(content: &str, slug: bool) -> String {
    let cleaned: String = clean_text(content)
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let collapsed = collapse_whitespace(&cleaned);
    if slug {
        collapsed.to_lowercase()
    } else {
        collapsed
    }
}

/// Fix encoding and whitespace while keeping punctuation intact.
pub fn clean_text(content: &str) -> String {
    let decoded = decode_entities(content);
    let composed: String = decoded.nfkc().collect();
    collapse_whitespace(&composed)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode `&name;`, `&#NN;` and `&#xNN;` references left double-escaped by
/// the catalog. Unknown or malformed references are left as-is.
fn decode_entities(s: &str) -> String {
    match unescape_with(s, resolve_html5_entity) {
        Ok(decoded) => decoded.into_owned(),
        // A stray '&' fails the whole string; retry word by word so it only
        // costs its own word
        Err(_) => s
            .split_inclusive(char::is_whitespace)
            .map(|word| unescape_with(word, resolve_html5_entity).unwrap_or(Cow::Borrowed(word)))
            .collect(),
    }
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
