//! Composition facade.
//!
//! [`PromptPilot`] owns the three dictionaries and the settings, exposes
//! the core operations, and implements the dispatch that decides which
//! search serves a given caret position. The embedding UI feeds it raw
//! text, caret offsets and selected candidates, and receives plain data.

use std::collections::HashSet;

use crate::config::Settings;
use crate::error::PilotError;
use crate::insertion::{self, Candidate, InsertionPlan};
use crate::parser::{self, ParseResult, WordKind};
use crate::remote::client::RemoteTag;
use crate::search;
use crate::search::{LoraHit, TagHit};
use crate::store::{
    DictionaryPayload, LoraStore, SuggestionRecord, SuggestionStore, TagId, TagStore,
};

/// How many suggestions show when the active word is empty.
const SUGGESTION_DISPLAY_LIMIT: usize = 10;

/// Trigger prefix routing a query to the remote search.
const REMOTE_TRIGGER: char = '*';

/// Why no completion is offered for a caret position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A dictionary is still loading or failed to load.
    NotLoaded,
    /// The caret sits inside protected syntax.
    ProtectedBlock,
    /// An empty reference block has nothing to search for yet.
    EmptyReference,
    /// The active word is empty and suggestions are disabled.
    SuggestionsDisabled,
}

/// What the dispatch decided to offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    None(SkipReason),
    Suggestions(Vec<SuggestionRecord>),
    Tags(Vec<TagHit>),
    Loras(Vec<LoraHit>),
    /// Forward `query` to the remote search worker; its results arrive
    /// asynchronously and merge into the dictionary.
    Remote { query: String },
}

pub struct PromptPilot {
    settings: Settings,
    tags: TagStore,
    loras: LoraStore,
    suggestions: SuggestionStore,
}

impl PromptPilot {
    pub fn new(settings: Settings) -> Self {
        PromptPilot {
            settings,
            tags: TagStore::default(),
            loras: LoraStore::default(),
            suggestions: SuggestionStore::default(),
        }
    }

    /// Build a pilot and load the bulk dictionary payload in one step.
    pub fn with_dictionary(settings: Settings, payload_json: &str) -> Result<Self, PilotError> {
        let mut pilot = PromptPilot::new(settings);
        pilot.load_dictionary(payload_json)?;
        Ok(pilot)
    }

    /// Load the bulk dictionary payload. A malformed payload marks every
    /// store failed and leaves them uninitialized.
    pub fn load_dictionary(&mut self, payload_json: &str) -> Result<(), PilotError> {
        match DictionaryPayload::from_json(payload_json) {
            Ok(payload) => {
                self.tags.load(&payload.tag_models);
                self.loras.load(&payload.lora_models);
                self.suggestions.load(&payload.suggestion_models);
                Ok(())
            }
            Err(e) => {
                log::warn!("dictionary payload rejected: {}", e);
                self.tags.mark_failed();
                self.loras.mark_failed();
                self.suggestions.mark_failed();
                Err(e)
            }
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub fn loras(&self) -> &LoraStore {
        &self.loras
    }

    pub fn suggestions(&self) -> &SuggestionStore {
        &self.suggestions
    }

    pub fn parse(&self, prompt: &str, caret: usize) -> ParseResult {
        parser::parse(prompt, caret)
    }

    pub fn search_tags(&self, query: &str, priority: &[String]) -> Vec<TagHit> {
        search::tags::search(&self.tags, query, priority, &self.settings.caps)
    }

    pub fn search_lora(&self, query: &str) -> Vec<LoraHit> {
        search::lora::search(&self.loras, query, self.settings.caps.lora)
    }

    pub fn search_suggestions(
        &self,
        anchor: Option<&str>,
        exclude: &HashSet<String>,
    ) -> Vec<SuggestionRecord> {
        self.suggestions.search(anchor, exclude)
    }

    pub fn plan_insertion(&self, parse: &ParseResult, candidate: &Candidate) -> InsertionPlan {
        insertion::plan(parse, candidate, &self.tags, &self.loras, &self.settings)
    }

    /// Merge remote search results into the tag dictionary (idempotent) and
    /// return the backing ids, in arrival order, for display.
    pub fn merge_remote(&mut self, tags: &[RemoteTag]) -> Vec<TagId> {
        self.tags.merge_remote(tags)
    }

    /// Decide what to offer for a parsed caret position.
    pub fn compose(&self, parse: &ParseResult) -> Completion {
        if !(self.tags.is_loaded() && self.loras.is_loaded() && self.suggestions.is_loaded()) {
            return Completion::None(SkipReason::NotLoaded);
        }
        if parse.in_protected_block {
            return Completion::None(SkipReason::ProtectedBlock);
        }

        let query = parse.active_word.as_str();
        if parse.active().kind == WordKind::Reference {
            if query.is_empty() {
                return Completion::None(SkipReason::EmptyReference);
            }
            return Completion::Loras(self.search_lora(query));
        }
        if query.is_empty() && !self.settings.suggest_enabled {
            return Completion::None(SkipReason::SuggestionsDisabled);
        }

        // Words already present never get re-suggested; the nearest
        // preceding tag anchors the co-occurrence lookup
        let exclude: HashSet<String> = parse
            .words
            .iter()
            .enumerate()
            .filter(|(index, word)| *index != parse.active_index && word.kind == WordKind::Tag)
            .map(|(_, word)| word.value.clone())
            .collect();
        let anchor = parse.words[..parse.active_index]
            .iter()
            .rev()
            .find(|word| word.kind == WordKind::Tag)
            .map(|word| word.value.as_str());
        let suggestions = self.search_suggestions(anchor, &exclude);

        if query.is_empty() {
            return Completion::Suggestions(
                suggestions
                    .into_iter()
                    .take(SUGGESTION_DISPLAY_LIMIT)
                    .collect(),
            );
        }

        if let Some(rest) = query.strip_prefix(REMOTE_TRIGGER)
            && !rest.is_empty()
        {
            return Completion::Remote {
                query: rest.to_string(),
            };
        }

        let priority: Vec<String> = suggestions
            .iter()
            .filter(|suggestion| suggestion.value.starts_with(query))
            .map(|suggestion| suggestion.value.clone())
            .collect();
        Completion::Tags(self.search_tags(query, &priority))
    }
}

#[cfg(test)]
#[path = "pilot_tests.rs"]
mod pilot_tests;
