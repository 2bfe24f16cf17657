//! Bulk dictionary payload, consumed once at startup.
//!
//! The payload format is owned by the external loader; this module only
//! mirrors its shape. Both snake_case and the loader's camelCase section
//! names are accepted.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::PilotError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DictionaryPayload {
    #[serde(default, alias = "tagModels")]
    pub tag_models: HashMap<String, TagEntry>,
    #[serde(default, alias = "loraModels")]
    pub lora_models: HashMap<String, LoraEntry>,
    #[serde(default, alias = "suggestionModels")]
    pub suggestion_models: HashMap<String, HashMap<String, u64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagEntry {
    pub post_count: u64,
    pub category: String,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub use_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoraEntry {
    #[serde(default)]
    pub search_words: Vec<String>,
    #[serde(default)]
    pub preview_file: Option<String>,
}

impl DictionaryPayload {
    pub fn from_json(document: &str) -> Result<DictionaryPayload, PilotError> {
        serde_json::from_str(document).map_err(|e| PilotError::MalformedPayload(e.to_string()))
    }
}
