//! Co-occurrence suggestion table.
//!
//! Maps a tag value to follow-up candidates, pre-sorted descending by
//! co-occurrence count at load time (ties break ascending by value so load
//! order never leaks into result order).

use std::collections::{HashMap, HashSet};

use crate::store::LoadState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRecord {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Default)]
pub struct SuggestionStore {
    table: HashMap<String, Vec<SuggestionRecord>>,
    state: LoadState,
}

impl SuggestionStore {
    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn mark_failed(&mut self) {
        self.state = LoadState::Failed;
    }

    pub fn load(&mut self, suggestion_models: &HashMap<String, HashMap<String, u64>>) {
        self.table.clear();
        for (anchor, counts) in suggestion_models {
            let mut candidates: Vec<SuggestionRecord> = counts
                .iter()
                .map(|(value, count)| SuggestionRecord {
                    value: value.clone(),
                    count: *count,
                })
                .collect();
            candidates.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
            self.table.insert(anchor.clone(), candidates);
        }
        self.state = LoadState::Loaded;
        log::debug!("suggestion store loaded: {} anchors", self.table.len());
    }

    /// Follow-up candidates for `anchor`, preserving the precomputed order
    /// and excluding values already present in the prompt. No re-ranking.
    pub fn search(&self, anchor: Option<&str>, exclude: &HashSet<String>) -> Vec<SuggestionRecord> {
        let Some(anchor) = anchor else {
            return Vec::new();
        };
        let Some(candidates) = self.table.get(anchor) else {
            return Vec::new();
        };
        candidates
            .iter()
            .filter(|candidate| !exclude.contains(&candidate.value))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "suggestions_tests.rs"]
mod suggestions_tests;
