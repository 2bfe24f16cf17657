//! Tag dictionary: record table, alias resolution and the prefix index.

use std::collections::{HashMap, HashSet};

use crate::remote::client::RemoteTag;
use crate::store::LoadState;
use crate::store::payload::TagEntry;
use crate::text::WORD_SEPARATORS;

/// Handle into the store's record table. Alias records reference their
/// canonical counterpart by id, never by pointer.
pub type TagId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKind {
    Canonical,
    Alias { canonical: TagId },
}

#[derive(Debug, Clone)]
pub struct TagRecord {
    /// Display text, space-separated.
    pub value: String,
    /// `value` split on space/underscore/hyphen.
    pub tokens: Vec<String>,
    /// Tokens joined with no separator.
    pub flat_value: String,
    pub category: String,
    pub use_count: u64,
    pub post_count: u64,
    pub kind: TagKind,
}

impl TagRecord {
    pub fn new(
        value: &str,
        category: &str,
        use_count: u64,
        post_count: u64,
        kind: TagKind,
    ) -> TagRecord {
        let tokens: Vec<String> = value.split(WORD_SEPARATORS).map(str::to_string).collect();
        let flat_value = tokens.concat();
        TagRecord {
            value: value.to_string(),
            tokens,
            flat_value,
            category: category.to_string(),
            use_count,
            post_count,
            kind,
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self.kind, TagKind::Canonical)
    }

    pub fn canonical_id(&self) -> Option<TagId> {
        match self.kind {
            TagKind::Canonical => None,
            TagKind::Alias { canonical } => Some(canonical),
        }
    }
}

/// Longest prefix registered in the index per token.
const MAX_PREFIX_LEN: usize = 3;

#[derive(Debug, Default)]
pub struct TagStore {
    records: Vec<TagRecord>,
    by_value: HashMap<String, TagId>,
    prefix_index: HashMap<String, Vec<TagId>>,
    state: LoadState,
}

impl TagStore {
    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn mark_failed(&mut self) {
        self.state = LoadState::Failed;
    }

    pub fn record(&self, id: TagId) -> &TagRecord {
        &self.records[id]
    }

    pub fn get(&self, value: &str) -> Option<&TagRecord> {
        self.by_value.get(value).map(|id| &self.records[*id])
    }

    pub fn id_of(&self, value: &str) -> Option<TagId> {
        self.by_value.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Text inserted for a record: its own value for canonical records, the
    /// canonical value for aliases.
    pub fn insert_value(&self, id: TagId) -> &str {
        match self.records[id].kind {
            TagKind::Canonical => &self.records[id].value,
            TagKind::Alias { canonical } => &self.records[canonical].value,
        }
    }

    /// Candidate set registered under a prefix key.
    pub fn candidates(&self, prefix: &str) -> &[TagId] {
        self.prefix_index
            .get(prefix)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Build the store from the bulk payload. Entries are processed in
    /// sorted key order so canonical/alias collisions resolve the same way
    /// on every load.
    pub fn load(&mut self, tag_models: &HashMap<String, TagEntry>) {
        self.records.clear();
        self.by_value.clear();
        self.prefix_index.clear();

        let mut values: Vec<&String> = tag_models.keys().collect();
        values.sort();
        for value in values {
            let entry = &tag_models[value];
            let canonical_id = self.define_canonical(value, entry);
            for alias in &entry.aliases {
                self.define_alias(alias, entry, canonical_id);
            }
        }
        self.state = LoadState::Loaded;
        log::debug!(
            "tag store loaded: {} records, {} prefixes",
            self.records.len(),
            self.prefix_index.len()
        );
    }

    /// Register `value` as a canonical tag. A record previously created as
    /// an alias is upgraded in place: canonical status always wins, its
    /// alias pointer is cleared and its stats refreshed.
    fn define_canonical(&mut self, value: &str, entry: &TagEntry) -> TagId {
        match self.by_value.get(value) {
            Some(&id) => {
                let record = &mut self.records[id];
                record.kind = TagKind::Canonical;
                record.category = entry.category.clone();
                record.use_count = entry.use_count;
                record.post_count = entry.post_count;
                id
            }
            None => self.insert(TagRecord::new(
                value,
                &entry.category,
                entry.use_count,
                entry.post_count,
                TagKind::Canonical,
            )),
        }
    }

    /// Register `alias` pointing at `canonical_id`. An existing canonical
    /// record keeps its status; an existing alias keeps its first target.
    fn define_alias(&mut self, alias: &str, entry: &TagEntry, canonical_id: TagId) {
        if self.by_value.contains_key(alias) {
            return;
        }
        self.insert(TagRecord::new(
            alias,
            &entry.category,
            entry.use_count,
            entry.post_count,
            TagKind::Alias {
                canonical: canonical_id,
            },
        ));
    }

    /// Append records discovered by the remote search. Idempotent: values
    /// already present are left untouched. Returns the ids backing each
    /// incoming item, existing or new, in input order.
    pub fn merge_remote(&mut self, tags: &[RemoteTag]) -> Vec<TagId> {
        let mut ids = Vec::with_capacity(tags.len());
        for tag in tags {
            if let Some(&id) = self.by_value.get(&tag.value) {
                ids.push(id);
                continue;
            }
            let kind = match &tag.canonical_value {
                Some(label) => match self.by_value.get(label) {
                    Some(&canonical) => TagKind::Alias { canonical },
                    // Canonical form not in the dictionary: treat the alias
                    // as a standalone canonical record
                    None => TagKind::Canonical,
                },
                None => TagKind::Canonical,
            };
            ids.push(self.insert(TagRecord::new(
                &tag.value,
                &tag.category,
                0,
                tag.post_count,
                kind,
            )));
        }
        ids
    }

    fn insert(&mut self, record: TagRecord) -> TagId {
        let id = self.records.len();
        self.by_value.insert(record.value.clone(), id);
        self.register_prefixes(&record, id);
        self.records.push(record);
        id
    }

    /// Register every prefix of length 1..=3 of every token of the value.
    fn register_prefixes(&mut self, record: &TagRecord, id: TagId) {
        let mut seen: HashSet<String> = HashSet::new();
        for token in record.value.split(WORD_SEPARATORS) {
            let len = token.chars().count().min(MAX_PREFIX_LEN);
            for n in 1..=len {
                let prefix: String = token.chars().take(n).collect();
                if seen.insert(prefix.clone()) {
                    self.prefix_index.entry(prefix).or_default().push(id);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tags_tests;
