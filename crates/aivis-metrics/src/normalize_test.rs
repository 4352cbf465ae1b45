use std::collections::BTreeMap;

use aivis_core::Source;

use super::*;

fn mentioning(brands: &[&str]) -> RunResult {
    RunResult {
        provider: "openai".to_string(),
        prompt: "best travel magazines".to_string(),
        brand_mentioned: Some(false),
        competitors_mentioned: brands.iter().map(|b| (*b).to_string()).collect(),
        ..RunResult::default()
    }
}

// -----------------------------------------------------------------------
// build_normalization_map
// -----------------------------------------------------------------------

#[test]
fn higher_frequency_spelling_wins() {
    let results = vec![
        mentioning(&["Condé Nast Traveler"]),
        mentioning(&["Conde Nast Traveler"]),
        mentioning(&["Conde Nast Traveler"]),
        mentioning(&["Conde Nast Traveler"]),
    ];
    let map = build_normalization_map(&results);
    assert_eq!(map.get("Condé Nast Traveler"), Some("Conde Nast Traveler"));
    assert_eq!(map.get("Conde Nast Traveler"), None);
}

#[test]
fn frequency_tie_prefers_ascii_spelling() {
    let results = vec![mentioning(&["Condé Nast"]), mentioning(&["Conde Nast"])];
    let map = build_normalization_map(&results);
    assert_eq!(map.resolve("Condé Nast"), "Conde Nast");
}

#[test]
fn case_variants_merge_to_most_frequent() {
    let results = vec![
        mentioning(&["HubSpot"]),
        mentioning(&["HubSpot"]),
        mentioning(&["Hubspot"]),
    ];
    let map = build_normalization_map(&results);
    assert_eq!(map.resolve("Hubspot"), "HubSpot");
}

#[test]
fn longer_name_merges_into_multi_word_prefix() {
    let results = vec![
        mentioning(&["National Geographic"]),
        mentioning(&["National Geographic Traveler"]),
    ];
    let map = build_normalization_map(&results);
    assert_eq!(
        map.get("National Geographic Traveler"),
        Some("National Geographic")
    );
}

#[test]
fn short_single_word_prefix_does_not_merge() {
    let results = vec![mentioning(&["Gap"]), mentioning(&["Gap Kids Outlet"])];
    let map = build_normalization_map(&results);
    assert!(map.is_empty(), "unexpected mappings: {map:?}");
}

#[test]
fn prefix_merge_repoints_existing_variants() {
    let results = vec![
        mentioning(&["Nátional Geographic Traveler"]),
        mentioning(&["National Geographic Traveler"]),
        mentioning(&["National Geographic Traveler"]),
        mentioning(&["National Geographic"]),
    ];
    let map = build_normalization_map(&results);
    assert_eq!(
        map.resolve("Nátional Geographic Traveler"),
        "National Geographic"
    );
    assert_eq!(
        map.resolve("National Geographic Traveler"),
        "National Geographic"
    );
}

#[test]
fn chained_prefixes_resolve_to_shortest() {
    let results = vec![
        mentioning(&["National Geographic"]),
        mentioning(&["National Geographic Traveler"]),
        mentioning(&["National Geographic Traveler Magazine"]),
    ];
    let map = build_normalization_map(&results);
    assert_eq!(
        map.resolve("National Geographic Traveler Magazine"),
        "National Geographic"
    );
}

#[test]
fn map_is_idempotent_and_has_no_identity_entries() {
    let results = vec![
        mentioning(&["Condé Nast Traveler", "National Geographic"]),
        mentioning(&["Conde Nast Traveler", "National Geographic Traveler"]),
        mentioning(&["CONDE NAST TRAVELER", "Nátional Geographic"]),
    ];
    let map = build_normalization_map(&results);
    assert!(!map.is_empty());
    for (variant, canonical) in map.iter() {
        assert_ne!(variant, canonical);
        assert_eq!(map.resolve(canonical), canonical, "{canonical} is remapped");
    }
}

#[test]
fn sentiment_keys_are_counted() {
    let mut result = mentioning(&["Conde Nast Traveler"]);
    result
        .competitor_sentiments
        .insert("Conde Nast Traveler".to_string(), Sentiment::NeutralMention);
    let other = mentioning(&["Condé Nast Traveler"]);
    let map = build_normalization_map(&[result, other]);
    assert_eq!(map.resolve("Condé Nast Traveler"), "Conde Nast Traveler");
}

// -----------------------------------------------------------------------
// apply_brand_normalization
// -----------------------------------------------------------------------

#[test]
fn apply_rewrites_and_dedupes_preserving_order() {
    let results = vec![
        mentioning(&["Conde Nast Traveler", "Vogue", "Condé Nast Traveler"]),
        mentioning(&["Conde Nast Traveler"]),
    ];
    let map = build_normalization_map(&results);
    let normalized = apply_brand_normalization(&results, &map);
    assert_eq!(
        normalized[0].competitors_mentioned,
        vec!["Conde Nast Traveler".to_string(), "Vogue".to_string()]
    );
}

#[test]
fn apply_merges_sentiments_with_max_priority() {
    let mut result = mentioning(&["Condé Nast Traveler", "Conde Nast Traveler"]);
    result.competitor_sentiments = BTreeMap::from([
        (
            "Condé Nast Traveler".to_string(),
            Sentiment::PositiveEndorsement,
        ),
        ("Conde Nast Traveler".to_string(), Sentiment::NeutralMention),
    ]);
    let results = vec![result, mentioning(&["Conde Nast Traveler"])];
    let map = build_normalization_map(&results);
    let normalized = apply_brand_normalization(&results, &map);
    assert_eq!(normalized[0].competitor_sentiments.len(), 1);
    assert_eq!(
        normalized[0].competitor_sentiments["Conde Nast Traveler"],
        Sentiment::PositiveEndorsement
    );
}

#[test]
fn apply_never_lets_not_mentioned_win() {
    let mut result = mentioning(&["Conde Nast", "Condé Nast"]);
    result.competitor_sentiments = BTreeMap::from([
        ("Condé Nast".to_string(), Sentiment::NegativeComparison),
        ("Conde Nast".to_string(), Sentiment::NotMentioned),
    ]);
    let results = vec![result, mentioning(&["Conde Nast"])];
    let map = build_normalization_map(&results);
    let normalized = apply_brand_normalization(&results, &map);
    assert_eq!(
        normalized[0].competitor_sentiments["Conde Nast"],
        Sentiment::NegativeComparison
    );
}

#[test]
fn apply_rewrites_source_brand_sentiments() {
    let mut result = mentioning(&["Conde Nast Traveler"]);
    result.sources.push(Source {
        url: "https://example.com".to_string(),
        title: None,
        brand_sentiments: BTreeMap::from([(
            "Condé Nast Traveler".to_string(),
            Sentiment::StrongEndorsement,
        )]),
    });
    let results = vec![result, mentioning(&["Conde Nast Traveler"])];
    let map = build_normalization_map(&results);
    let normalized = apply_brand_normalization(&results, &map);
    assert!(normalized[0].sources[0]
        .brand_sentiments
        .contains_key("Conde Nast Traveler"));
}

#[test]
fn apply_twice_equals_apply_once() {
    let results = vec![
        mentioning(&["Condé Nast Traveler", "National Geographic Traveler"]),
        mentioning(&["Conde Nast Traveler", "National Geographic"]),
        mentioning(&["Conde Nast Traveler", "Condé Nast Traveler"]),
    ];
    let map = build_normalization_map(&results);
    let once = apply_brand_normalization(&results, &map).into_owned();
    let twice = apply_brand_normalization(&once, &map).into_owned();
    assert_eq!(once, twice);
}

#[test]
fn apply_borrows_when_nothing_changes() {
    let results = vec![mentioning(&["Nike"]), mentioning(&["Adidas"])];
    let map = build_normalization_map(&results);
    assert!(matches!(
        apply_brand_normalization(&results, &map),
        Cow::Borrowed(_)
    ));
}
