//! Multi-term prefix search over the tag dictionary.
//!
//! Candidates come from the prefix index, matching assigns query terms to
//! tag tokens, aliases are suppressed when their canonical form matched at
//! least as well, and the surviving hits are ordered by a deterministic
//! multi-key comparator before the per-category caps are applied.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::config::ResultCaps;
use crate::store::tags::{TagId, TagStore};
use crate::text::WORD_SEPARATORS;

/// One query term matched against one token slot of a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    pub term: String,
    /// Index of the tag token the term consumed (0 for a flat-value match).
    pub token_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHit {
    pub id: TagId,
    pub is_priority: bool,
    pub matches: Vec<TagMatch>,
}

/// Prefix key a term is looked up under: the term itself when short, its
/// first three characters otherwise.
fn prefix_key(term: &str) -> String {
    term.chars().take(3).collect()
}

fn split_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(WORD_SEPARATORS)
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Assign query terms to the record's tokens: the flat value consumes slot
/// 0, otherwise the first still-free token the term prefixes. Terms that
/// fit nowhere are simply unmatched.
fn match_terms(store: &TagStore, id: TagId, terms: &[String]) -> Vec<TagMatch> {
    let record = store.record(id);
    let mut matches = Vec::new();
    let mut used_slots: HashSet<usize> = HashSet::new();
    for term in terms {
        if !used_slots.contains(&0) && record.flat_value.starts_with(term.as_str()) {
            matches.push(TagMatch {
                term: term.clone(),
                token_index: 0,
            });
            used_slots.insert(0);
            continue;
        }
        for (index, token) in record.tokens.iter().enumerate() {
            if !used_slots.contains(&index) && token.starts_with(term.as_str()) {
                matches.push(TagMatch {
                    term: term.clone(),
                    token_index: index,
                });
                used_slots.insert(index);
                break;
            }
        }
    }
    matches
}

/// Search the dictionary. `priority` values sort ahead of everything else;
/// caps bound how many results each category may contribute.
pub fn search(store: &TagStore, query: &str, priority: &[String], caps: &ResultCaps) -> Vec<TagHit> {
    let terms = split_terms(query);
    if terms.is_empty() {
        return Vec::new();
    }
    let joined_query: Option<String> = if terms.len() > 1 {
        Some(terms.concat())
    } else {
        None
    };
    let priority_set: HashSet<&str> = priority.iter().map(String::as_str).collect();

    let mut hits: Vec<TagHit> = Vec::new();
    let mut selected: HashSet<TagId> = HashSet::new();
    for term in &terms {
        for &id in store.candidates(&prefix_key(term)) {
            if selected.contains(&id) {
                continue;
            }
            let record = store.record(id);
            let matches = match &joined_query {
                Some(joined) if record.value.starts_with(joined.as_str()) => terms
                    .iter()
                    .enumerate()
                    .map(|(index, term)| TagMatch {
                        term: term.clone(),
                        token_index: index,
                    })
                    .collect(),
                _ => match_terms(store, id, &terms),
            };
            if !matches.is_empty() {
                selected.insert(id);
                hits.push(TagHit {
                    id,
                    is_priority: priority_set.contains(record.value.as_str()),
                    matches,
                });
            }
        }
    }

    // Alias suppression: drop an alias when its canonical form matched
    // independently with at least as many terms
    let canonical_match_counts: HashMap<TagId, usize> = hits
        .iter()
        .filter(|hit| store.record(hit.id).is_canonical())
        .map(|hit| (hit.id, hit.matches.len()))
        .collect();
    hits.retain(|hit| match store.record(hit.id).canonical_id() {
        Some(canonical) => match canonical_match_counts.get(&canonical) {
            Some(count) => *count < hit.matches.len(),
            None => true,
        },
        None => true,
    });

    // Per-term frequency over the surviving hits, summed per record as a
    // late tie-break key
    let mut term_frequency: HashMap<&str, u64> = HashMap::new();
    for hit in &hits {
        for m in &hit.matches {
            *term_frequency.entry(m.term.as_str()).or_insert(0) += 1;
        }
    }
    let result_counts: HashMap<TagId, u64> = hits
        .iter()
        .map(|hit| {
            let count = hit
                .matches
                .iter()
                .map(|m| term_frequency.get(m.term.as_str()).copied().unwrap_or(0))
                .sum();
            (hit.id, count)
        })
        .collect();

    hits.sort_by(|a, b| {
        compare_hits(
            store,
            a,
            b,
            query,
            joined_query.as_deref(),
            terms.len(),
            &result_counts,
        )
    });

    apply_caps(store, hits, caps)
}

/// The ranking comparator. Key order is load-bearing; every stage must
/// stay exactly as listed.
fn compare_hits(
    store: &TagStore,
    a: &TagHit,
    b: &TagHit,
    query: &str,
    joined_query: Option<&str>,
    term_count: usize,
    result_counts: &HashMap<TagId, u64>,
) -> Ordering {
    let record_a = store.record(a.id);
    let record_b = store.record(b.id);

    // Priority hits first
    let ordering = b.is_priority.cmp(&a.is_priority);
    if ordering != Ordering::Equal {
        return ordering;
    }

    // An exact value match on the raw query (or the joined query) wins
    let exact = |value: &str| value == query || joined_query.is_some_and(|j| value == j);
    let a_exact = exact(&record_a.value);
    let b_exact = exact(&record_b.value);
    if a_exact != b_exact {
        return if a_exact { Ordering::Less } else { Ordering::Greater };
    }

    // More matched terms first
    let ordering = b.matches.len().cmp(&a.matches.len());
    if ordering != Ordering::Equal {
        return ordering;
    }

    // Both full matches: earlier token indices win, compared pairwise
    if a.matches.len() == term_count {
        for (ma, mb) in a.matches.iter().zip(&b.matches) {
            let ordering = ma.token_index.cmp(&mb.token_index);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
    }

    let ordering = record_b.use_count.cmp(&record_a.use_count);
    if ordering != Ordering::Equal {
        return ordering;
    }

    let count_a = result_counts.get(&a.id).copied().unwrap_or(0);
    let count_b = result_counts.get(&b.id).copied().unwrap_or(0);
    let ordering = count_b.cmp(&count_a);
    if ordering != Ordering::Equal {
        return ordering;
    }

    let ordering = record_b.post_count.cmp(&record_a.post_count);
    if ordering != Ordering::Equal {
        return ordering;
    }

    record_a.value.cmp(&record_b.value)
}

/// Consume hits in ranked order, each category contributing until its cap
/// is exhausted. `-1` is unlimited, `0` hides the category, categories
/// without a bucket contribute nothing.
fn apply_caps(store: &TagStore, hits: Vec<TagHit>, caps: &ResultCaps) -> Vec<TagHit> {
    let mut remaining: HashMap<String, i64> = HashMap::new();
    hits.into_iter()
        .filter(|hit| {
            let category = &store.record(hit.id).category;
            let Some(cap) = caps.for_category(category) else {
                return false;
            };
            let counter = remaining.entry(category.clone()).or_insert(cap);
            if *counter == -1 {
                return true;
            }
            if *counter > 0 {
                *counter -= 1;
                return true;
            }
            false
        })
        .collect()
}

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tags_tests;
