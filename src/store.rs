pub mod lora;
pub mod payload;
pub mod suggestions;
pub mod tags;

// Re-export public types
pub use lora::{LoraRecord, LoraStore};
pub use payload::DictionaryPayload;
pub use suggestions::{SuggestionRecord, SuggestionStore};
pub use tags::{TagId, TagKind, TagRecord, TagStore};

/// Load lifecycle of a dictionary store. A store that fails to build is
/// left uninitialized rather than partially built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loaded,
    Failed,
}

impl LoadState {
    pub fn is_loaded(self) -> bool {
        self == LoadState::Loaded
    }

    pub fn has_error(self) -> bool {
        self == LoadState::Failed
    }
}
