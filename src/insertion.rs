//! Insertion planning.
//!
//! Given a parse result and a selected candidate, compute the exact text
//! replacement: which span of the prompt to replace and what to insert,
//! honoring the user's separator conventions. The result is pure data;
//! splicing it into the live text field is the embedder's responsibility.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{DelimiterMode, Settings};
use crate::parser::ParseResult;
use crate::store::lora::LoraStore;
use crate::store::tags::{TagId, TagStore};
use crate::text::{
    WORD_SEPARATORS, escape_prompt, escape_regex, slice_chars, split_with_positions,
    unescape_prompt,
};

/// A selected completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Tag(TagId),
    /// Index into the lora store's record list.
    Lora(usize),
    /// A co-occurrence suggestion, carried by value.
    Suggestion(String),
}

/// The computed replacement: splice `insert_text` over the character range
/// `start..end` of the prompt and place the caret after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionPlan {
    pub start: usize,
    pub end: usize,
    pub insert_text: String,
}

/// A complete reference-block tail after the name offset:
/// `name:multiplier>`. The multiplier never spans another block.
static REFERENCE_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^<>:]+(:[^<>]*>)").expect("reference tail pattern"));

/// Default multiplier appended when completing an open reference block.
const DEFAULT_MULTIPLIER: &str = ":1>";

pub fn plan(
    parse: &ParseResult,
    candidate: &Candidate,
    tags: &TagStore,
    loras: &LoraStore,
    settings: &Settings,
) -> InsertionPlan {
    match candidate {
        Candidate::Tag(id) => plan_tag(parse, *id, tags, settings),
        Candidate::Lora(index) => plan_lora(parse, *index, loras),
        Candidate::Suggestion(value) => plan_suggestion(parse, value, tags, settings),
    }
}

fn plan_tag(parse: &ParseResult, id: TagId, tags: &TagStore, settings: &Settings) -> InsertionPlan {
    let record = tags.record(id);
    let mut start = parse.active().position;

    // Backtracking scan: when the user has already typed a leading fragment
    // of the tag after a partial separator, move the start forward to the
    // earliest sub-segment that is such a fragment, so the typed part is
    // replaced instead of duplicated.
    let mut targets: Vec<&str> = vec![record.value.as_str()];
    if let Some(canonical) = record.canonical_id() {
        targets.push(tags.record(canonical).value.as_str());
    }
    let typed_span = slice_chars(&parse.prompt, start, parse.caret);
    let mut shift: Option<usize> = None;
    for segment in split_with_positions(&typed_span, WORD_SEPARATORS) {
        if segment.text.is_empty() {
            continue;
        }
        let literal = escape_regex(&unescape_prompt(&segment.text));
        let Ok(pattern) = Regex::new(&format!("(?i)(?:^|[ _-]){literal}")) else {
            continue;
        };
        if targets.iter().any(|target| pattern.is_match(target))
            && shift.is_none_or(|s| s > segment.position)
        {
            shift = Some(segment.position);
        }
    }
    if let Some(s) = shift {
        start += s;
    }

    let mut text = apply_delimiter_convention(
        tags.insert_value(id).to_string(),
        &record.category,
        parse,
        settings,
    );
    if parse.needs_leading_comma {
        text.insert_str(0, ", ");
    } else if shift.unwrap_or(0) == 0 && parse.needs_leading_space {
        text.insert(0, ' ');
    }
    let mut text = escape_prompt(&text);
    if settings.append_comma {
        text.push(',');
    }
    text.push(' ');

    InsertionPlan {
        start,
        end: parse.caret,
        insert_text: text,
    }
}

fn plan_lora(parse: &ParseResult, index: usize, loras: &LoraStore) -> InsertionPlan {
    let record = &loras.records()[index];
    let start = parse.active().position;
    let mut text = record.value.clone();

    // When the name sits inside an already-complete block, keep its
    // multiplier and replace through the closer; otherwise append a default
    // multiplier and replace up to the caret
    let tail = slice_chars(&parse.prompt, start, parse.prompt.chars().count());
    let end = match REFERENCE_TAIL_RE.captures(&tail) {
        Some(caps) => {
            text.push_str(&caps[1]);
            start + caps[0].chars().count()
        }
        None => {
            text.push_str(DEFAULT_MULTIPLIER);
            parse.caret
        }
    };
    text.push(' ');

    InsertionPlan {
        start,
        end,
        insert_text: text,
    }
}

fn plan_suggestion(
    parse: &ParseResult,
    value: &str,
    tags: &TagStore,
    settings: &Settings,
) -> InsertionPlan {
    let category = tags
        .get(value)
        .map(|record| record.category.clone())
        .unwrap_or_else(|| "custom".to_string());

    let mut text =
        apply_delimiter_convention(value.to_string(), &category, parse, settings);
    if parse.needs_leading_comma {
        text.insert_str(0, ", ");
    } else if parse.needs_leading_space {
        text.insert(0, ' ');
    }
    let mut text = escape_prompt(&text);
    if settings.append_comma {
        text.push(',');
    }
    text.push(' ');

    InsertionPlan {
        start: parse.active().position,
        end: parse.caret,
        insert_text: text,
    }
}

/// Underscore-vs-space normalization: the always-space and
/// always-underscore lists override everything; otherwise the category's
/// configured mode decides, with `auto` replicating whatever convention the
/// typed query used.
fn apply_delimiter_convention(
    value: String,
    category: &str,
    parse: &ParseResult,
    settings: &Settings,
) -> String {
    if settings.always_space_set().contains(&value) {
        return value;
    }
    let to_underscore = settings.always_underscore_set().contains(&value)
        || match settings.delimiter_mode(category) {
            DelimiterMode::Underscore => true,
            DelimiterMode::Space => false,
            DelimiterMode::Auto => parse.active_word.contains('_'),
        };
    if to_underscore {
        value.replace(' ', "_")
    } else {
        value
    }
}

#[cfg(test)]
#[path = "insertion_tests.rs"]
mod insertion_tests;
