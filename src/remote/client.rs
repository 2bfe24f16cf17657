//! Remote tag autocomplete API client.
//!
//! A plain GET with a free-text query, returning a JSON array of
//! `{label, category, post_count, antecedent?}` items. An `antecedent`
//! marks the item as an alias whose canonical form is `label`.

use serde::Deserialize;

use crate::error::PilotError;

/// Default autocomplete endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://danbooru.donmai.us/autocomplete.json";

const RESULT_LIMIT: u32 = 50;
const API_VERSION: u32 = 1;

/// One tag delivered by the remote search, before store resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTag {
    pub value: String,
    pub category: String,
    pub post_count: u64,
    /// When set, `value` is an alias of this canonical label.
    pub canonical_value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiItem {
    label: String,
    category: i64,
    #[serde(default)]
    post_count: u64,
    #[serde(default)]
    antecedent: Option<String>,
}

/// Seam for the worker thread: anything that can answer a tag query.
pub trait TagSearchBackend: Send + 'static {
    fn search(&self, query: &str) -> Result<Vec<RemoteTag>, PilotError>;
}

/// HTTP-backed search client.
pub struct RemoteClient {
    endpoint: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Default for RemoteClient {
    fn default() -> Self {
        RemoteClient::new(DEFAULT_ENDPOINT)
    }
}

impl RemoteClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        RemoteClient {
            endpoint: endpoint.into(),
            agent: ureq::agent(),
        }
    }

    /// Decode a response document into remote tags.
    pub fn parse_response(document: &str) -> Result<Vec<RemoteTag>, PilotError> {
        let items: Vec<ApiItem> =
            serde_json::from_str(document).map_err(|e| PilotError::Remote(e.to_string()))?;
        Ok(items
            .into_iter()
            .map(|item| match item.antecedent {
                Some(antecedent) => RemoteTag {
                    value: antecedent,
                    category: item.category.to_string(),
                    post_count: item.post_count,
                    canonical_value: Some(item.label),
                },
                None => RemoteTag {
                    value: item.label,
                    category: item.category.to_string(),
                    post_count: item.post_count,
                    canonical_value: None,
                },
            })
            .collect())
    }
}

impl TagSearchBackend for RemoteClient {
    fn search(&self, query: &str) -> Result<Vec<RemoteTag>, PilotError> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("search[query]", query)
            .query("search[type]", "tag")
            .query("limit", &RESULT_LIMIT.to_string())
            .query("version", &API_VERSION.to_string())
            .call()
            .map_err(|e| PilotError::Remote(e.to_string()))?;
        let document = response
            .into_string()
            .map_err(|e| PilotError::Remote(e.to_string()))?;
        RemoteClient::parse_response(&document)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
