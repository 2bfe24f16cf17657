//! Lora dictionary: a flat record list, searched by linear scan.

use std::collections::HashMap;

use crate::store::LoadState;
use crate::store::payload::LoraEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoraRecord {
    /// Model identifier as written into the reference block.
    pub value: String,
    /// Alternate strings the record can be found under.
    pub search_words: Vec<String>,
    pub preview_file: Option<String>,
}

#[derive(Debug, Default)]
pub struct LoraStore {
    records: Vec<LoraRecord>,
    state: LoadState,
}

impl LoraStore {
    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn mark_failed(&mut self) {
        self.state = LoadState::Failed;
    }

    pub fn records(&self) -> &[LoraRecord] {
        &self.records
    }

    pub fn load(&mut self, lora_models: &HashMap<String, LoraEntry>) {
        self.records.clear();
        let mut values: Vec<&String> = lora_models.keys().collect();
        values.sort();
        for value in values {
            let entry = &lora_models[value];
            self.records.push(LoraRecord {
                value: value.clone(),
                search_words: entry.search_words.clone(),
                preview_file: entry.preview_file.clone(),
            });
        }
        self.state = LoadState::Loaded;
        log::debug!("lora store loaded: {} records", self.records.len());
    }
}
