//! Tests for tag search matching, ranking and caps

use std::collections::HashMap;

use super::*;
use crate::store::payload::TagEntry;

fn entry(category: &str, use_count: u64, post_count: u64, aliases: &[&str]) -> TagEntry {
    TagEntry {
        post_count,
        category: category.to_string(),
        is_deprecated: false,
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        use_count,
    }
}

fn store_with(entries: Vec<(&str, TagEntry)>) -> TagStore {
    let models: HashMap<String, TagEntry> = entries
        .into_iter()
        .map(|(value, entry)| (value.to_string(), entry))
        .collect();
    let mut store = TagStore::default();
    store.load(&models);
    store
}

fn result_values<'a>(store: &'a TagStore, hits: &[TagHit]) -> Vec<&'a str> {
    hits.iter()
        .map(|hit| store.record(hit.id).value.as_str())
        .collect()
}

fn unlimited_caps() -> ResultCaps {
    ResultCaps {
        group0: -1,
        group1: -1,
        group3: -1,
        group4: -1,
        group5: -1,
        custom: -1,
        lora: -1,
    }
}

#[test]
fn test_single_term_prefix_match() {
    let store = store_with(vec![
        ("1girl", entry("0", 100, 1000, &[])),
        ("solo", entry("0", 90, 900, &[])),
    ]);
    let hits = search(&store, "1g", &[], &unlimited_caps());
    assert_eq!(result_values(&store, &hits), vec!["1girl"]);
    assert_eq!(hits[0].matches.len(), 1);
    assert_eq!(hits[0].matches[0].token_index, 0);
}

#[test]
fn test_use_count_breaks_equal_prefix_matches() {
    let store = store_with(vec![
        ("1guy", entry("0", 5, 100, &[])),
        ("1girl", entry("0", 100, 100, &[])),
    ]);
    let hits = search(&store, "1g", &[], &unlimited_caps());
    assert_eq!(result_values(&store, &hits), vec!["1girl", "1guy"]);
}

#[test]
fn test_alias_suppressed_when_canonical_matches_equally() {
    let store = store_with(vec![("cat girl", entry("0", 10, 100, &["catgirl"]))]);
    let hits = search(&store, "catgi", &[], &unlimited_caps());
    assert_eq!(result_values(&store, &hits), vec!["cat girl"]);
    assert_eq!(store.insert_value(hits[0].id), "cat girl");
}

#[test]
fn test_alias_kept_when_it_matches_strictly_better() {
    // The alias "catgirl city" matches both query terms, the canonical
    // "cat girl" only one, so the alias survives and outranks it
    let store = store_with(vec![("cat girl", entry("0", 10, 100, &["catgirl city"]))]);
    let hits = search(&store, "cat ci", &[], &unlimited_caps());
    let values = result_values(&store, &hits);
    assert_eq!(values, vec!["catgirl city", "cat girl"]);
}

#[test]
fn test_exact_value_match_sorts_first() {
    let store = store_with(vec![
        ("cat", entry("0", 1, 1, &[])),
        ("cattle", entry("0", 9999, 9999, &[])),
    ]);
    let hits = search(&store, "cat", &[], &unlimited_caps());
    assert_eq!(result_values(&store, &hits), vec!["cat", "cattle"]);
}

#[test]
fn test_priority_sorts_before_everything() {
    let store = store_with(vec![
        ("solo", entry("0", 1, 1, &[])),
        ("socks", entry("0", 9999, 9999, &[])),
    ]);
    let priority = vec!["solo".to_string()];
    let hits = search(&store, "so", &priority, &unlimited_caps());
    assert_eq!(result_values(&store, &hits), vec!["solo", "socks"]);
    assert!(hits[0].is_priority);
}

#[test]
fn test_multi_term_matches_tokens_in_order() {
    let store = store_with(vec![("long blonde hair", entry("0", 10, 10, &[]))]);
    let hits = search(&store, "lo ha", &[], &unlimited_caps());
    assert_eq!(hits.len(), 1);
    let indices: Vec<usize> = hits[0].matches.iter().map(|m| m.token_index).collect();
    assert_eq!(indices, vec![0, 2]);
}

#[test]
fn test_earlier_token_indices_rank_higher_on_full_match() {
    let store = store_with(vec![
        ("red long hair", entry("0", 10, 10, &[])),
        ("long red hair", entry("0", 10, 10, &[])),
    ]);
    let hits = search(&store, "red ha", &[], &unlimited_caps());
    // "red long hair" matches red at token 0, "long red hair" at token 1
    assert_eq!(
        result_values(&store, &hits),
        vec!["red long hair", "long red hair"]
    );
}

#[test]
fn test_joined_query_short_circuits_to_full_match() {
    let store = store_with(vec![
        ("catgirl uniform", entry("0", 10, 10, &[])),
        ("cat girl", entry("0", 10, 10, &[])),
    ]);
    let hits = search(&store, "cat girl", &[], &unlimited_caps());
    // Both fully match; the raw-query exact match wins over the joined one
    assert_eq!(result_values(&store, &hits)[0], "cat girl");
    assert_eq!(hits.iter().filter(|h| h.matches.len() == 2).count(), 2);
}

#[test]
fn test_result_count_breaks_partial_match_ties() {
    // Query "ca gi do": "cat girl" matches {ca, gi}, "cat dog" matches
    // {ca, do}, "giant" matches {gi}. Term frequencies ca=2 gi=2 do=1 give
    // "cat girl" sum 4 and "cat dog" sum 3.
    let store = store_with(vec![
        ("cat dog", entry("0", 0, 0, &[])),
        ("cat girl", entry("0", 0, 0, &[])),
        ("giant", entry("0", 0, 0, &[])),
    ]);
    let hits = search(&store, "ca gi do", &[], &unlimited_caps());
    assert_eq!(
        result_values(&store, &hits),
        vec!["cat girl", "cat dog", "giant"]
    );
}

#[test]
fn test_lexicographic_final_tie_break() {
    let store = store_with(vec![
        ("beta", entry("0", 0, 0, &[])),
        ("bear", entry("0", 0, 0, &[])),
    ]);
    let hits = search(&store, "be", &[], &unlimited_caps());
    assert_eq!(result_values(&store, &hits), vec!["bear", "beta"]);
}

#[test]
fn test_post_count_breaks_before_lexicographic() {
    let store = store_with(vec![
        ("beta", entry("0", 0, 50, &[])),
        ("bear", entry("0", 0, 10, &[])),
    ]);
    let hits = search(&store, "be", &[], &unlimited_caps());
    assert_eq!(result_values(&store, &hits), vec!["beta", "bear"]);
}

#[test]
fn test_record_not_duplicated_across_term_keys() {
    let store = store_with(vec![("cat girl", entry("0", 10, 10, &[]))]);
    // Both terms fetch the same record under different prefix keys
    let hits = search(&store, "cat girl", &[], &unlimited_caps());
    assert_eq!(hits.len(), 1);
}

#[test]
fn test_terms_longer_than_three_use_three_char_key() {
    let store = store_with(vec![("masterpiece", entry("0", 10, 10, &[]))]);
    let hits = search(&store, "masterp", &[], &unlimited_caps());
    assert_eq!(result_values(&store, &hits), vec!["masterpiece"]);
    // A term whose tail diverges from the record no longer matches even
    // though the three-char key still finds the candidate
    let hits = search(&store, "masxyz", &[], &unlimited_caps());
    assert!(hits.is_empty());
}

#[test]
fn test_empty_query_returns_empty() {
    let store = store_with(vec![("solo", entry("0", 10, 10, &[]))]);
    assert!(search(&store, "", &[], &unlimited_caps()).is_empty());
    assert!(search(&store, "  _- ", &[], &unlimited_caps()).is_empty());
}

#[test]
fn test_category_cap_limits_results() {
    let mut caps = unlimited_caps();
    caps.group0 = 2;
    let store = store_with(vec![
        ("sa", entry("0", 40, 0, &[])),
        ("sb", entry("0", 30, 0, &[])),
        ("sc", entry("0", 20, 0, &[])),
        ("sd", entry("1", 10, 0, &[])),
    ]);
    let hits = search(&store, "s", &[], &caps);
    assert_eq!(result_values(&store, &hits), vec!["sa", "sb", "sd"]);
}

#[test]
fn test_category_cap_zero_hides_category() {
    let mut caps = unlimited_caps();
    caps.group0 = 0;
    let store = store_with(vec![
        ("sa", entry("0", 40, 0, &[])),
        ("sd", entry("1", 10, 0, &[])),
    ]);
    let hits = search(&store, "s", &[], &caps);
    assert_eq!(result_values(&store, &hits), vec!["sd"]);
}

#[test]
fn test_unlimited_cap_passes_everything() {
    let store = store_with(vec![
        ("sa", entry("0", 40, 0, &[])),
        ("sb", entry("0", 30, 0, &[])),
        ("sc", entry("0", 20, 0, &[])),
    ]);
    let hits = search(&store, "s", &[], &unlimited_caps());
    assert_eq!(hits.len(), 3);
}

#[test]
fn test_unconfigured_category_contributes_nothing() {
    let store = store_with(vec![("sa", entry("2", 40, 0, &[]))]);
    let hits = search(&store, "s", &[], &unlimited_caps());
    assert!(hits.is_empty());
}

#[test]
fn test_ranking_is_deterministic_across_calls() {
    let store = store_with(vec![
        ("aa bb", entry("0", 0, 0, &[])),
        ("aa cc", entry("0", 0, 0, &[])),
        ("aa dd", entry("0", 0, 0, &[])),
        ("aab", entry("0", 0, 0, &["aa bb cc"])),
    ]);
    let first = search(&store, "aa", &[], &unlimited_caps());
    for _ in 0..5 {
        let again = search(&store, "aa", &[], &unlimited_caps());
        assert_eq!(first, again);
    }
}
