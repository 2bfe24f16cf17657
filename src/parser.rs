//! Structural prompt parser.
//!
//! Converts raw prompt text plus a caret offset into an ordered list of
//! structural words with caret-relative metadata: which word the caret is
//! in, whether the caret sits inside protected syntax (numeric weights,
//! reference multipliers, control keywords, dynamic-prompt selectors), and
//! what separator the next insertion needs to prepend.
//!
//! The scan is a single left-to-right pass over a preprocessed copy of the
//! text. Preprocessing masks spans in place without changing character
//! counts, so every reported position refers to the original text.

use std::sync::LazyLock;

use regex::Regex;

/// Kind of a parsed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    /// An ordinary tag word.
    Tag,
    /// The name inside a `<lora:...>` / `<lyco:...>` reference block.
    Reference,
}

/// One editable unit of the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedWord {
    /// Trimmed text, with underscores displayed as spaces.
    pub value: String,
    /// Character offset of the word's first content character in the
    /// original text.
    pub position: usize,
    pub kind: WordKind,
    /// True iff the caret lay within this word's span at parse time.
    pub is_active: bool,
}

/// Result of scanning a prompt around a caret.
///
/// Exactly one word is active. `active_word` is the active word's trimmed
/// text as accumulated up to the caret, captured before underscore
/// normalization — it is the query string callers feed to the searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub words: Vec<ParsedWord>,
    pub active_index: usize,
    pub active_word: String,
    /// Caret sits inside protected syntax; insertion must be suppressed.
    pub in_protected_block: bool,
    pub needs_leading_comma: bool,
    pub needs_leading_space: bool,
    /// The original prompt text, for the insertion planner.
    pub prompt: String,
    /// The caret as a character offset into `prompt`.
    pub caret: usize,
}

impl ParseResult {
    /// The word containing the caret.
    pub fn active(&self) -> &ParsedWord {
        &self.words[self.active_index]
    }
}

/// Nesting contexts tracked by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nest {
    Root,
    Paren,
    Square,
    Curly,
    Angle,
    Reference,
}

impl Nest {
    fn opener(ch: char) -> Option<Nest> {
        match ch {
            '(' => Some(Nest::Paren),
            '[' => Some(Nest::Square),
            '{' => Some(Nest::Curly),
            '<' => Some(Nest::Angle),
            _ => None,
        }
    }

    fn closer(self) -> Option<char> {
        match self {
            Nest::Root => None,
            Nest::Paren => Some(')'),
            Nest::Square => Some(']'),
            Nest::Curly => Some('}'),
            Nest::Angle | Nest::Reference => Some('>'),
        }
    }

    fn is_delimiter(self, ch: char) -> bool {
        match self {
            Nest::Root | Nest::Paren => ch == ',',
            Nest::Square => matches!(ch, ',' | ':' | '|'),
            Nest::Curly | Nest::Angle => matches!(ch, ',' | '|'),
            Nest::Reference => false,
        }
    }

    fn word_kind(self) -> WordKind {
        match self {
            Nest::Reference => WordKind::Reference,
            _ => WordKind::Tag,
        }
    }
}

fn is_closer(ch: char) -> bool {
    matches!(ch, ')' | ']' | '}' | '>')
}

/// Length of the `lora:` / `lyco:` prefix inside a reference block.
const REFERENCE_PREFIX_LEN: usize = 5;

static META_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(BREAK|AND|ADDCOMM|ADDBASE|ADDCOL|ADDROW)\b").expect("meta keyword pattern")
});

static DYNAMIC_PROMPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([\d-]+\$\$(?:[^}]+?\$\$)?)(.*)\}").expect("dynamic prompt pattern")
});

/// Mask spans that must act as delimiters or dead space without shifting
/// any character offsets: control keywords become a comma padded with NULs
/// to the same length, and the selector of a dynamic-prompt block becomes
/// NULs of the same length.
fn preprocess(prompt: &str) -> Vec<char> {
    let masked = META_KEYWORD_RE.replace_all(prompt, |caps: &regex::Captures| {
        let len = caps[0].chars().count();
        let mut rep = String::with_capacity(len);
        rep.push(',');
        for _ in 1..len {
            rep.push('\0');
        }
        rep
    });
    let masked = DYNAMIC_PROMPT_RE.replace_all(&masked, |caps: &regex::Captures| {
        let selector_len = caps[1].chars().count();
        let mut rep = String::with_capacity(caps[0].len());
        rep.push('{');
        for _ in 0..selector_len {
            rep.push('\0');
        }
        rep.push_str(&caps[2]);
        rep.push('}');
        rep
    });
    masked.chars().collect()
}

/// True when the `<` at `chars[i]` opens a reference block.
fn is_reference_opener(chars: &[char], i: usize) -> bool {
    if chars.len().saturating_sub(i) <= REFERENCE_PREFIX_LEN {
        return false;
    }
    let prefix: String = chars[i + 1..=i + REFERENCE_PREFIX_LEN].iter().collect();
    prefix == "lora:" || prefix == "lyco:"
}

/// A weight or multiplier suffix counts as numeric only when the entire
/// trimmed text parses as a finite number.
fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.parse::<f64>().map(|v| v.is_finite()).unwrap_or(false)
}

/// Parse `prompt` around the caret (a character offset; offsets past the
/// end are treated as the end).
pub fn parse(prompt: &str, caret: usize) -> ParseResult {
    Scanner::new(prompt, caret).run()
}

struct Scanner<'a> {
    prompt: &'a str,
    caret: usize,
    nest: Vec<Nest>,
    escaped: bool,
    /// Most recent delimiter-ish character seen since the last flushed word.
    delimiter: Option<char>,
    fresh_line: bool,
    current: ParsedWord,
    words: Vec<ParsedWord>,
    active_index: Option<usize>,
    active_word: String,
    in_protected_block: bool,
    needs_leading_comma: bool,
    needs_leading_space: bool,
}

impl<'a> Scanner<'a> {
    fn new(prompt: &'a str, caret: usize) -> Self {
        Scanner {
            prompt,
            caret,
            nest: vec![Nest::Root],
            escaped: false,
            delimiter: None,
            fresh_line: true,
            current: ParsedWord {
                value: String::new(),
                position: 0,
                kind: WordKind::Tag,
                is_active: false,
            },
            words: Vec::new(),
            active_index: None,
            active_word: String::new(),
            in_protected_block: false,
            needs_leading_comma: false,
            needs_leading_space: false,
        }
    }

    fn current_nest(&self) -> Nest {
        self.nest.last().copied().unwrap_or(Nest::Root)
    }

    fn mark_active(&mut self) {
        self.current.is_active = true;
        self.active_word = self.current.value.trim().to_string();
        self.active_index = Some(self.words.len());
    }

    fn start_word(&mut self, nest: Nest, position: usize) {
        self.current = ParsedWord {
            value: String::new(),
            position,
            kind: nest.word_kind(),
            is_active: false,
        };
    }

    /// Trim and emit the current word. Empty words are dropped unless they
    /// are the active one — keeping the active word even when empty is what
    /// allows completion at an empty position.
    fn flush(&mut self) {
        self.current.value = self.current.value.trim().to_string();
        if self.current.is_active || !self.current.value.is_empty() {
            let word = std::mem::replace(
                &mut self.current,
                ParsedWord {
                    value: String::new(),
                    position: 0,
                    kind: WordKind::Tag,
                    is_active: false,
                },
            );
            self.words.push(word);
            self.fresh_line = false;
            self.delimiter = None;
        }
    }

    fn note_delimiter(&mut self, ch: char) {
        if ch == '\n' {
            self.fresh_line = true;
        } else if matches!(ch, ',' | '|' | ':' | '(' | '[' | '{' | '<') {
            self.delimiter = Some(ch);
        }
    }

    /// Derive the prepend hints for the word about to be flushed: no
    /// delimiter since the previous word means a comma is needed (plus a
    /// space unless at a fresh line start); a bare comma means a space.
    fn update_prepend_flags(&mut self) {
        if !self.current.is_active || self.words.is_empty() {
            return;
        }
        match self.delimiter {
            None => {
                self.needs_leading_comma = true;
                if !self.fresh_line {
                    self.needs_leading_space = true;
                }
            }
            Some(',') => self.needs_leading_space = true,
            Some(_) => {}
        }
    }

    /// Weight cleanup when a `)` or `]` closes at `closer_pos`: a trailing
    /// `:number` is an emphasis weight and is stripped; a bare number
    /// directly inside `[...]` is a pure weight placeholder and is cleared.
    fn strip_weight_suffix(&mut self, nest: Nest, closer_pos: usize) {
        if let Some(colon) = self.current.value.rfind(':') {
            let weight = self.current.value[colon + 1..].to_string();
            if is_numeric(&weight) {
                if self.current.is_active && closer_pos - self.caret <= weight.chars().count() {
                    self.in_protected_block = true;
                }
                self.current.value.truncate(colon);
            }
        } else if nest == Nest::Square && is_numeric(&self.current.value) {
            if self.current.is_active
                && closer_pos - self.caret <= self.current.value.chars().count()
            {
                self.in_protected_block = true;
            }
            self.current.value.clear();
        }
    }

    /// Multiplier cleanup when a reference block closes: everything after
    /// the first colon is the multiplier and is stripped from the name.
    fn strip_multiplier(&mut self, closer_pos: usize) {
        if let Some(colon) = self.current.value.find(':') {
            let multiplier = self.current.value[colon + 1..].to_string();
            if self.current.is_active && closer_pos - self.caret <= multiplier.chars().count() {
                self.in_protected_block = true;
            }
            self.current.value.truncate(colon);
        }
    }

    fn run(mut self) -> ParseResult {
        let chars = preprocess(self.prompt);
        let mut i = 0usize;
        while i < chars.len() {
            if i == self.caret {
                self.mark_active();
            }
            let ch = chars[i];
            let nest = self.current_nest();

            // NUL placeholders left by preprocessing: dead space that keeps
            // offsets stable. Inside the active word they mark the caret as
            // protected.
            if ch == '\0' {
                if self.current.is_active {
                    self.in_protected_block = true;
                    self.needs_leading_space = true;
                }
                self.current.position += 1;
                i += 1;
                continue;
            }
            if ch == '\n' {
                self.update_prepend_flags();
                self.flush();
                self.note_delimiter('\n');
                self.start_word(nest, i + 1);
                self.escaped = false;
                i += 1;
                continue;
            }
            if self.escaped {
                self.current.value.push(ch);
                self.escaped = false;
                i += 1;
                continue;
            }
            if ch == '\\' {
                self.escaped = true;
                i += 1;
                continue;
            }

            if let Some(opener) = Nest::opener(ch) {
                let opener = if opener == Nest::Angle && is_reference_opener(&chars, i) {
                    Nest::Reference
                } else {
                    opener
                };
                self.nest.push(opener);
                let word_position;
                if opener == Nest::Reference {
                    i += REFERENCE_PREFIX_LEN;
                    if i >= self.caret && i - self.caret < REFERENCE_PREFIX_LEN {
                        self.in_protected_block = true;
                    }
                    word_position = i + 1;
                } else {
                    word_position = i;
                }
                self.update_prepend_flags();
                self.flush();
                self.note_delimiter(ch);
                self.start_word(opener, word_position);
                i += 1;
                continue;
            }

            if is_closer(ch) {
                // A closer that does not match the innermost open context is
                // literal text.
                if Some(ch) != nest.closer() {
                    self.current.value.push(ch);
                    i += 1;
                    continue;
                }
                match nest {
                    Nest::Paren | Nest::Square => self.strip_weight_suffix(nest, i),
                    Nest::Reference => self.strip_multiplier(i),
                    _ => {}
                }
                self.nest.pop();
                self.update_prepend_flags();
                self.flush();
                self.note_delimiter(ch);
                self.start_word(self.current_nest(), i + 1);
                i += 1;
                continue;
            }

            if nest == Nest::Reference {
                // Leading spaces before the name are dropped; afterwards the
                // name is taken verbatim, internal spaces included.
                if !self.current.value.is_empty() || ch != ' ' {
                    self.current.value.push(ch);
                }
                i += 1;
                continue;
            }

            if nest.is_delimiter(ch) {
                self.update_prepend_flags();
                self.flush();
                self.note_delimiter(ch);
                self.start_word(nest, i + 1);
                i += 1;
                continue;
            }

            if self.current.value.is_empty() {
                self.current.position = i;
            }
            self.current.value.push(ch);
            i += 1;
        }

        // Caret at (or past) the end of input: the final in-progress word is
        // the active one.
        if self.active_index.is_none() {
            self.mark_active();
        }
        self.update_prepend_flags();
        self.flush();
        for word in &mut self.words {
            if word.value.contains('_') {
                word.value = word.value.replace('_', " ");
            }
        }

        ParseResult {
            words: self.words,
            active_index: self.active_index.unwrap_or(0),
            active_word: self.active_word,
            in_protected_block: self.in_protected_block,
            needs_leading_comma: self.needs_leading_comma,
            needs_leading_space: self.needs_leading_space,
            prompt: self.prompt.to_string(),
            caret: self.caret,
        }
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod parser_tests;
