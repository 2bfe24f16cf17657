//! Escape and split helpers shared by the parser and the insertion planner.
//!
//! All positions produced here are character offsets, never byte offsets;
//! the parser and planner address the prompt text the same way.

/// Separator characters between the words of a tag value (`"cat girl"`,
/// `"cat_girl"`, `"cat-girl"` are the same three-way split).
pub const WORD_SEPARATORS: &[char] = &[' ', '_', '-'];

/// A split segment together with its character offset in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub position: usize,
}

/// Escape regex metacharacters so a string can be embedded in a pattern
/// as a literal.
pub fn escape_regex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(
            ch,
            '.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']' | '\\'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Backslash-escape the characters that are structurally significant to the
/// prompt syntax: `{ } ( ) [ ] \`.
pub fn escape_prompt(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '{' | '}' | '(' | ')' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Inverse of [`escape_prompt`]: each backslash consumes itself and emits the
/// following character literally. A trailing lone backslash is emitted as-is.
/// Total over all inputs, escaped or not.
pub fn unescape_prompt(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Split `input` on any of `delimiters`, keeping each segment's original
/// character offset. Delimiter matches are discarded; the last segment is
/// always emitted, even when empty.
pub fn split_with_positions(input: &str, delimiters: &[char]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut start = 0usize;
    for (pos, ch) in input.chars().enumerate() {
        if delimiters.contains(&ch) {
            segments.push(Segment {
                text: std::mem::take(&mut current),
                position: start,
            });
            start = pos + 1;
        } else {
            current.push(ch);
        }
    }
    segments.push(Segment {
        text: current,
        position: start,
    });
    segments
}

/// Slice `input` by character offsets, clamped to the input length.
pub(crate) fn slice_chars(input: &str, start: usize, end: usize) -> String {
    input
        .chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod text_tests;
