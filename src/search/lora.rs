//! Substring search over the lora dictionary.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::store::lora::LoraStore;
use crate::text::WORD_SEPARATORS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoraHit {
    /// Index into [`LoraStore::records`].
    pub index: usize,
    pub matched_terms: Vec<String>,
    /// Some query term is a prefix of some token of the record's value.
    prefix_match: bool,
}

fn split_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(WORD_SEPARATORS)
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_separators(word: &str) -> String {
    word.chars()
        .filter(|c| !WORD_SEPARATORS.contains(c))
        .collect()
}

fn has_prefix_match(value: &str, terms: &[String]) -> bool {
    terms.iter().any(|term| {
        value
            .split(WORD_SEPARATORS)
            .any(|token| token.starts_with(term.as_str()))
    })
}

/// Search the flat lora list: every query term must be substring-contained
/// in some search word (separators stripped) for the record to qualify.
/// A negative cap is unlimited.
pub fn search(store: &LoraStore, query: &str, cap: i64) -> Vec<LoraHit> {
    let terms = split_terms(query);
    if terms.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<LoraHit> = Vec::new();
    for (index, record) in store.records().iter().enumerate() {
        let mut matched: BTreeSet<&str> = BTreeSet::new();
        for word in &record.search_words {
            let flat_word = strip_separators(word);
            for term in &terms {
                if flat_word.contains(term.as_str()) {
                    matched.insert(term);
                }
            }
        }
        if matched.len() == terms.len() {
            hits.push(LoraHit {
                index,
                matched_terms: matched.into_iter().map(str::to_string).collect(),
                prefix_match: has_prefix_match(&record.value, &terms),
            });
        }
    }

    hits.sort_by(|a, b| compare_hits(store, a, b, query));

    if cap < 0 {
        return hits;
    }
    hits.truncate(cap as usize);
    hits
}

fn compare_hits(store: &LoraStore, a: &LoraHit, b: &LoraHit, query: &str) -> Ordering {
    let value_a = &store.records()[a.index].value;
    let value_b = &store.records()[b.index].value;

    let a_exact = value_a == query;
    let b_exact = value_b == query;
    if a_exact != b_exact {
        return if a_exact { Ordering::Less } else { Ordering::Greater };
    }

    let ordering = b.matched_terms.len().cmp(&a.matched_terms.len());
    if ordering != Ordering::Equal {
        return ordering;
    }

    let ordering = b.prefix_match.cmp(&a.prefix_match);
    if ordering != Ordering::Equal {
        return ordering;
    }

    value_a.cmp(value_b)
}

#[cfg(test)]
#[path = "lora_tests.rs"]
mod lora_tests;
