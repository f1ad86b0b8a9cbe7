use super::*;

const SEARCH_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items total="2" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
    <item type="boardgame" id="13">
        <name type="primary" value="CATAN"/>
        <yearpublished value="1995"/>
    </item>
    <item type="boardgameexpansion" id="325">
        <name type="alternate" value="Seefahrer"/>
        <name type="primary" value="Catan: Seafarers"/>
    </item>
</items>"#;

const COLLECTION_XML: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<items totalitems="2" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse" pubdate="Mon, 01 Jan 2024 00:00:00 +0000">
    <item objecttype="thing" objectid="13" subtype="boardgame" collid="1001">
        <name sortindex="1">CATAN</name>
        <yearpublished>1995</yearpublished>
        <image>https://cf.geekdo-images.com/catan.jpg</image>
        <thumbnail>https://cf.geekdo-images.com/catan_t.jpg</thumbnail>
        <status own="1" prevowned="0" fortrade="0" want="0" wanttoplay="1" wanttobuy="0" wishlist="0" preordered="0" lastmodified="2023-05-01 10:00:00"/>
        <numplays>12</numplays>
    </item>
    <item objecttype="thing" objectid="822" subtype="boardgame" collid="1002">
        <name sortindex="1">Carcassonne: Hunters &amp; Gatherers</name>
        <status own="1" prevowned="0" fortrade="0" want="0" wanttoplay="0" wanttobuy="0" wishlist="0" preordered="0" lastmodified="2023-05-01 10:00:00"/>
        <numplays>0</numplays>
    </item>
</items>"#;

const THING_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
    <item type="boardgame" id="13">
        <thumbnail>https://cf.geekdo-images.com/catan_t.jpg</thumbnail>
        <image>https://cf.geekdo-images.com/catan.jpg</image>
        <name type="alternate" sortindex="1" value="Die Siedler von Catan"/>
        <name type="primary" sortindex="1" value="CATAN"/>
        <description>In CATAN, players try to be the dominant force&amp;#10;&amp;#10;Trade &amp;mdash; build.</description>
        <yearpublished value="1995"/>
        <minplayers value="3"/>
        <maxplayers value="4"/>
        <poll name="suggested_numplayers" title="User Suggested Number of Players" totalvotes="2000">
            <results numplayers="2">
                <result value="Best" numvotes="10"/>
                <result value="Recommended" numvotes="100"/>
                <result value="Not Recommended" numvotes="900"/>
            </results>
            <results numplayers="3">
                <result value="Best" numvotes="800"/>
                <result value="Recommended" numvotes="700"/>
                <result value="Not Recommended" numvotes="50"/>
            </results>
            <results numplayers="4">
                <result value="Best" numvotes="1200"/>
                <result value="Recommended" numvotes="400"/>
                <result value="Not Recommended" numvotes="20"/>
            </results>
        </poll>
        <poll-summary name="suggested_numplayers" title="User Suggested Number of Players">
            <result name="bestwith" value="Best with 4 players"/>
        </poll-summary>
        <playingtime value="120"/>
        <minplaytime value="60"/>
        <maxplaytime value="120"/>
        <poll name="suggested_playerage" title="User Suggested Player Age" totalvotes="300">
            <results>
                <result value="8" numvotes="100"/>
                <result value="10" numvotes="200"/>
            </results>
        </poll>
        <link type="boardgamecategory" id="1021" value="Economic"/>
        <link type="boardgameexpansion" id="325" value="Catan: Seafarers"/>
        <link type="boardgameexpansion" id="926" value="Catan: Cities &amp; Knights"/>
        <statistics page="1">
            <ratings>
                <usersrated value="120000"/>
                <average value="7.09"/>
                <bayesaverage value="6.9"/>
                <averageweight value="2.29"/>
            </ratings>
        </statistics>
    </item>
</items>"#;

#[test]
fn parse_search_prefers_primary_name() {
    let results = parse_search(SEARCH_XML).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].object_id, "13");
    assert_eq!(results[0].kind, "boardgame");
    assert_eq!(results[0].name, "CATAN");
    assert_eq!(results[1].name, "Catan Seafarers");
}

#[test]
fn parse_empty_search() {
    let xml = r#"<items total="0" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse"></items>"#;
    assert!(parse_search(xml).unwrap().is_empty());
}

#[test]
fn parse_collection_items() {
    let collection = parse_collection(COLLECTION_XML).unwrap();
    assert_eq!(collection.total_items, 2);
    assert_eq!(collection.games.len(), 2);

    let catan = &collection.games[0];
    assert_eq!(catan.object_id, "13");
    assert_eq!(catan.label, "CATAN");
    assert_eq!(catan.name, "catan");
    assert_eq!(catan.year_published.as_deref(), Some("1995"));
    assert_eq!(catan.image_url, "https://cf.geekdo-images.com/catan.jpg");
    assert_eq!(catan.num_plays, 12);
    let status = catan.status.as_ref().unwrap();
    assert!(status.own);
    assert!(status.want_to_play);
    assert!(!status.for_trade);

    let carcassonne = &collection.games[1];
    assert_eq!(carcassonne.name, "carcassonne hunters gatherers");
    assert_eq!(carcassonne.image_url, FALLBACK_IMAGE_URL);
    assert_eq!(carcassonne.thumbnail_url, FALLBACK_IMAGE_URL);
    assert!(carcassonne.owned_by.is_empty());
}

#[test]
fn parse_collection_error_document() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<errors>
    <error>
        <message>Invalid username specified</message>
    </error>
</errors>"#;
    match parse_collection(xml) {
        Err(BggError::Api(message)) => assert_eq!(message, "Invalid username specified"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn parse_collection_item_without_objectid_fails() {
    let xml = r#"<items totalitems="1"><item subtype="boardgame"><name>X</name></item></items>"#;
    let err = parse_collection(xml).unwrap_err();
    assert!(err.is_parse_error());
}

#[test]
fn parse_thing_details() {
    let thing = parse_thing(THING_XML).unwrap();
    assert_eq!(thing.object_id, "13");
    assert_eq!(thing.kind, "boardgame");
    assert_eq!(thing.primary_name, "CATAN");
    assert_eq!(thing.year_published, Some(1995));
    assert_eq!(thing.min_players, 3);
    assert_eq!(thing.max_players, 4);
    assert_eq!(thing.min_playtime, 60);
    assert_eq!(thing.max_playtime, 120);
    assert!((thing.average_rating - 7.09).abs() < f64::EPSILON);
    assert!((thing.average_weight - 2.29).abs() < f64::EPSILON);
    assert_eq!(thing.image_url, "https://cf.geekdo-images.com/catan.jpg");
    assert_eq!(thing.thumbnail_url, "https://cf.geekdo-images.com/catan_t.jpg");
    assert_eq!(
        thing.description,
        "In CATAN, players try to be the dominant force&#10;&#10;Trade &mdash; build."
    );
}

#[test]
fn parse_thing_reads_only_player_count_poll() {
    let thing = parse_thing(THING_XML).unwrap();
    let counts: Vec<&str> = thing
        .player_count_poll
        .iter()
        .map(|b| b.player_count.as_str())
        .collect();
    assert_eq!(counts, vec!["2", "3", "4"]);
    assert_eq!(thing.player_count_poll[2].votes.len(), 3);
    assert_eq!(thing.player_count_poll[2].votes[0].votes, 1200);
}

#[test]
fn parse_thing_collects_outbound_expansions() {
    let xml = THING_XML.replace(
        r#"<link type="boardgamecategory" id="1021" value="Economic"/>"#,
        r#"<link type="boardgameexpansion" id="1" value="Base Game" inbound="true"/>"#,
    );
    let thing = parse_thing(&xml).unwrap();
    let ids: Vec<&str> = thing.expansions.iter().map(|e| e.object_id.as_str()).collect();
    assert_eq!(ids, vec!["325", "926"]);
    assert_eq!(thing.expansions[1].label, "Catan Cities Knights");
}

#[test]
fn parse_thing_without_images_uses_fallback() {
    let xml = r#"<items><item type="boardgame" id="99">
        <name type="primary" value="Obscure"/>
        <minplayers value="1"/>
        <maxplayers value="0"/>
    </item></items>"#;
    let thing = parse_thing(xml).unwrap();
    assert_eq!(thing.image_url, FALLBACK_IMAGE_URL);
    assert_eq!(thing.thumbnail_url, FALLBACK_IMAGE_URL);
    assert_eq!(thing.max_players, 0);
    assert_eq!(thing.year_published, None);
    assert!(thing.player_count_poll.is_empty());
}

#[test]
fn parse_thing_without_item_is_not_found() {
    let xml = r#"<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse"></items>"#;
    assert!(matches!(parse_thing(xml), Err(BggError::NotFound(_))));
}

#[test]
fn parse_thing_malformed_xml() {
    let xml = r#"<items><item type="boardgame" id="13"><name value="x"></items>"#;
    let err = parse_thing(xml).unwrap_err();
    assert!(err.is_parse_error());
}

#[test]
fn resolved_thing_has_best_counts() {
    let game = bgg_census_core::resolve(parse_thing(THING_XML).unwrap());
    assert_eq!(game.best_player_count, "3/4");
    assert_eq!(game.player_count_display, "3 - 4");
    assert_eq!(
        game.description,
        "In CATAN, players try to be the dominant force Trade \u{2014} build."
    );
}
