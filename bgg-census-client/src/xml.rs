//! Parsers for the XML API2 `search`, `collection` and `thing` responses.
//!
//! The parsers are forgiving: unknown elements are ignored,
//! missing numbers become zero, and missing images fall back to
//! [`FALLBACK_IMAGE_URL`]. Only a document that is not well-formed XML, or
//! one that is missing the identifying attributes of an item, is an error.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use bgg_census_core::{
    CollectionGame, CollectionStatus, Expansion, FALLBACK_IMAGE_URL, PollBucket, PollVote,
    RawThing, SearchResult, normalize,
};

use crate::error::BggError;

const PLAYER_COUNT_POLL: &str = "suggested_numplayers";
const EXPANSION_LINK: &str = "boardgameexpansion";

/// A user's collection as returned by upstream, before ownership is attached.
#[derive(Debug, Clone, Default)]
pub struct RawCollection {
    /// `totalitems` as reported by upstream.
    pub total_items: usize,
    pub games: Vec<CollectionGame>,
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, BggError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn required_attr(e: &BytesStart<'_>, name: &str) -> Result<String, BggError> {
    attr(e, name)?.ok_or_else(|| {
        BggError::parse(format!("<{}> is missing attribute '{name}'", tag_name(e)))
    })
}

fn number<T: std::str::FromStr + Default>(value: Option<&str>) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or_default()
}

/// Upstream reports an unknown year as 0.
fn year(value: Option<&str>) -> Option<i32> {
    value
        .and_then(|v| v.trim().parse::<i32>().ok())
        .filter(|y| *y != 0)
}

fn image_or_fallback(url: Option<String>) -> String {
    match url {
        Some(u) if !u.trim().is_empty() => u.trim().to_string(),
        _ => FALLBACK_IMAGE_URL.to_string(),
    }
}

/// Collect the `<message>` texts of an `<errors>` document.
fn read_error_messages(reader: &mut Reader<&[u8]>) -> Result<String, BggError> {
    let mut messages = Vec::new();
    let mut in_message = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"message" => in_message = true,
            Event::End(e) if e.name().as_ref() == b"message" => in_message = false,
            Event::Text(t) if in_message => messages.push(t.unescape()?.into_owned()),
            Event::Eof => break,
            _ => {}
        }
    }
    if messages.is_empty() {
        Ok("unknown error".to_string())
    } else {
        Ok(messages.join("; "))
    }
}

/// Parse a `search` response.
pub fn parse_search(xml: &str) -> Result<Vec<SearchResult>, BggError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut results = Vec::new();
    let mut current: Option<(String, String, Option<String>)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"errors" => {
                return Err(BggError::Api(read_error_messages(&mut reader)?));
            }
            Event::Start(e) if e.name().as_ref() == b"item" => {
                let id = required_attr(&e, "id")?;
                let kind = attr(&e, "type")?.unwrap_or_default();
                current = Some((id, kind, None));
            }
            Event::Empty(e) if e.name().as_ref() == b"name" => {
                if let Some((_, _, name)) = current.as_mut() {
                    let is_primary = attr(&e, "type")?.as_deref() == Some("primary");
                    if name.is_none() || is_primary {
                        *name = attr(&e, "value")?;
                    }
                }
            }
            Event::End(e) if e.name().as_ref() == b"item" => {
                if let Some((object_id, kind, name)) = current.take() {
                    results.push(SearchResult {
                        object_id,
                        kind,
                        name: normalize(&name.unwrap_or_default(), false),
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(results)
}

/// Parse a `collection` response. Every item becomes a game; ownership is
/// attached by the caller.
pub fn parse_collection(xml: &str) -> Result<RawCollection, BggError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut collection = RawCollection::default();
    let mut current: Option<CollectionGame> = None;
    let mut field = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"errors" => return Err(BggError::Api(read_error_messages(&mut reader)?)),
                b"items" => collection.total_items = number(attr(&e, "totalitems")?.as_deref()),
                b"item" => current = Some(collection_item(&e)?),
                _ => field = tag_name(&e),
            },
            Event::Empty(e) => {
                if e.name().as_ref() == b"status" {
                    if let Some(game) = current.as_mut() {
                        game.status = Some(collection_status(&e)?);
                    }
                }
            }
            Event::Text(t) => {
                if let Some(game) = current.as_mut() {
                    let text = t.unescape()?.into_owned();
                    match field.as_str() {
                        "name" => {
                            game.label = normalize(&text, false);
                            game.name = normalize(&game.label, true);
                        }
                        "yearpublished" => game.year_published = Some(text),
                        "image" => game.image_url = image_or_fallback(Some(text)),
                        "thumbnail" => game.thumbnail_url = image_or_fallback(Some(text)),
                        "numplays" => game.num_plays = number(Some(&text)),
                        _ => {}
                    }
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"item" {
                    if let Some(game) = current.take() {
                        collection.games.push(game);
                    }
                }
                field.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(collection)
}

fn collection_item(e: &BytesStart<'_>) -> Result<CollectionGame, BggError> {
    Ok(CollectionGame {
        object_id: required_attr(e, "objectid")?,
        subtype: attr(e, "subtype")?.unwrap_or_else(|| "boardgame".to_string()),
        label: String::new(),
        name: String::new(),
        year_published: None,
        image_url: FALLBACK_IMAGE_URL.to_string(),
        thumbnail_url: FALLBACK_IMAGE_URL.to_string(),
        num_plays: 0,
        status: None,
        owned_by: Vec::new(),
    })
}

fn collection_status(e: &BytesStart<'_>) -> Result<CollectionStatus, BggError> {
    let flag = |name: &str| -> Result<bool, BggError> { Ok(attr(e, name)?.as_deref() == Some("1")) };
    Ok(CollectionStatus {
        own: flag("own")?,
        prev_owned: flag("prevowned")?,
        for_trade: flag("fortrade")?,
        want: flag("want")?,
        want_to_play: flag("wanttoplay")?,
        want_to_buy: flag("wanttobuy")?,
        wishlist: flag("wishlist")?,
        preordered: flag("preordered")?,
        last_modified: attr(e, "lastmodified")?,
    })
}

/// Parse a `thing` response. Only the first `<item>` is read.
pub fn parse_thing(xml: &str) -> Result<RawThing, BggError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut thing: Option<RawThing> = None;
    let mut image: Option<String> = None;
    let mut thumbnail: Option<String> = None;
    let mut has_primary_name = false;
    let mut field = String::new();
    let mut in_player_poll = false;
    let mut bucket: Option<PollBucket> = None;

    loop {
        let event = reader.read_event()?;
        let is_empty = matches!(event, Event::Empty(_));
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = tag_name(e);
                if name == "errors" {
                    return Err(BggError::Api(read_error_messages(&mut reader)?));
                }
                if name == "item" && thing.is_none() {
                    thing = Some(RawThing {
                        object_id: required_attr(e, "id")?,
                        kind: attr(e, "type")?.unwrap_or_default(),
                        ..RawThing::default()
                    });
                    continue;
                }
                let Some(raw) = thing.as_mut() else {
                    continue;
                };
                let value = attr(e, "value")?;

                match name.as_str() {
                    "name" => {
                        let is_primary = attr(e, "type")?.as_deref() == Some("primary");
                        if is_primary || (!has_primary_name && raw.primary_name.is_empty()) {
                            raw.primary_name = value.unwrap_or_default();
                            has_primary_name |= is_primary;
                        }
                    }
                    "yearpublished" => raw.year_published = year(value.as_deref()),
                    "minplayers" => raw.min_players = number(value.as_deref()),
                    "maxplayers" => raw.max_players = number(value.as_deref()),
                    "minplaytime" => raw.min_playtime = number(value.as_deref()),
                    "maxplaytime" => raw.max_playtime = number(value.as_deref()),
                    "average" => raw.average_rating = number(value.as_deref()),
                    "averageweight" => raw.average_weight = number(value.as_deref()),
                    "poll" => {
                        in_player_poll = !is_empty
                            && attr(e, "name")?.as_deref() == Some(PLAYER_COUNT_POLL);
                    }
                    "results" if in_player_poll => {
                        let player_count = attr(e, "numplayers")?.unwrap_or_default();
                        let empty_bucket = PollBucket {
                            player_count,
                            votes: Vec::new(),
                        };
                        if is_empty {
                            raw.player_count_poll.push(empty_bucket);
                        } else {
                            bucket = Some(empty_bucket);
                        }
                    }
                    "result" if in_player_poll => {
                        if let Some(b) = bucket.as_mut() {
                            b.votes.push(PollVote {
                                value: value.unwrap_or_default(),
                                votes: number(attr(e, "numvotes")?.as_deref()),
                            });
                        }
                    }
                    "link" => {
                        let is_expansion = attr(e, "type")?.as_deref() == Some(EXPANSION_LINK);
                        let inbound = attr(e, "inbound")?.as_deref() == Some("true");
                        if is_expansion && !inbound {
                            raw.expansions.push(Expansion {
                                object_id: required_attr(e, "id")?,
                                label: normalize(&value.unwrap_or_default(), false),
                            });
                        }
                    }
                    _ => {}
                }

                if !is_empty {
                    field = name;
                }
            }
            Event::Text(t) => {
                if let Some(raw) = thing.as_mut() {
                    let text = t.unescape()?;
                    match field.as_str() {
                        "description" => raw.description.push_str(&text),
                        "image" => image = Some(text.into_owned()),
                        "thumbnail" => thumbnail = Some(text.into_owned()),
                        _ => {}
                    }
                }
            }
            Event::CData(c) => {
                if let Some(raw) = thing.as_mut() {
                    if field == "description" {
                        raw.description
                            .push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
            }
            Event::End(e) => {
                match e.name().as_ref() {
                    b"results" => {
                        if let (Some(raw), Some(b)) = (thing.as_mut(), bucket.take()) {
                            raw.player_count_poll.push(b);
                        }
                    }
                    b"poll" => in_player_poll = false,
                    b"item" if thing.is_some() => break,
                    _ => {}
                }
                field.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut raw = thing.ok_or_else(|| BggError::not_found("no item in thing response"))?;
    raw.image_url = image_or_fallback(image);
    raw.thumbnail_url = image_or_fallback(thumbnail);
    Ok(raw)
}

#[cfg(test)]
#[path = "tests/xml_tests.rs"]
mod tests;
