//! Autocomplete core for image-generation prompt editors.
//!
//! Watches nothing and renders nothing: callers hand in raw prompt text, a
//! caret offset, dictionaries and settings, and get plain data back. The
//! pieces:
//!
//! - [`parser`] — single-pass structural scan of the prompt around the
//!   caret: words, nesting, weights, reference blocks, protected spans.
//! - [`store`] — the tag/lora/suggestion dictionaries, with the prefix
//!   index and alias resolution.
//! - [`search`] — ranked tag and lora lookups with deterministic ordering.
//! - [`insertion`] — computes the exact replacement range and text for a
//!   selected candidate.
//! - [`remote`] — debounced, generation-tagged background lookups against
//!   the remote tag API.
//! - [`pilot`] — the facade owning the stores and dispatching searches.
//!
//! Offsets are character offsets throughout. Embedders adapting a DOM
//! `selectionStart` (UTF-16 units) convert at the boundary.

pub mod config;
pub mod error;
pub mod insertion;
pub mod parser;
pub mod pilot;
pub mod remote;
pub mod search;
pub mod store;
pub mod text;

pub use config::{DelimiterMode, ResultCaps, Settings};
pub use error::PilotError;
pub use insertion::{Candidate, InsertionPlan};
pub use parser::{ParseResult, ParsedWord, WordKind, parse};
pub use pilot::{Completion, PromptPilot, SkipReason};
