use super::*;

#[test]
fn normalize_strips_punctuation_and_collapses_whitespace() {
    assert_eq!(
        normalize("Ticket to Ride:   Europe\n", false),
        "Ticket to Ride Europe"
    );
}

#[test]
fn normalize_slug_lowercases() {
    assert_eq!(normalize("Catan: Seafarers", true), "catan seafarers");
}

#[test]
fn normalize_is_idempotent() {
    let once = normalize("  Agricola (Revised Edition) ", true);
    assert_eq!(normalize(&once, true), once);
}

#[test]
fn normalize_keeps_accented_letters() {
    assert_eq!(normalize("Café International", true), "café international");
}

#[test]
fn normalize_applies_nfkc() {
    // Fullwidth digits fold to ASCII
    assert_eq!(normalize("７ Wonders", false), "7 Wonders");
}

#[test]
fn clean_text_keeps_punctuation() {
    assert_eq!(clean_text("Build, trade &amp; settle."), "Build, trade & settle.");
}

#[test]
fn clean_text_decodes_numeric_and_named_entities() {
    assert_eq!(
        clean_text("Line one&#10;&#10;Line two &mdash; done"),
        "Line one Line two \u{2014} done"
    );
    assert_eq!(clean_text("&#x41;BC"), "ABC");
}

#[test]
fn clean_text_leaves_unknown_entities_alone() {
    assert_eq!(clean_text("R&D &bogus; team"), "R&D &bogus; team");
}

#[test]
fn normalize_empty_input() {
    assert_eq!(normalize("   ", true), "");
}

#[test]
fn clean_text_decodes_around_stray_ampersand() {
    assert_eq!(
        clean_text("Dungeons & Dragons &ndash; Players&apos; Handbook"),
        "Dungeons & Dragons \u{2013} Players' Handbook"
    );
}
