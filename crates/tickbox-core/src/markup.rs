//! Raw-mark tokenizer and placeholder codec.
//!
//! The wire markup is `_[ ]` for an unchecked mark and `_[x]` for a checked
//! one; the Cyrillic homoglyph `_[х]` is accepted on input and always
//! normalized to the Latin form on output. Tokenization replaces every raw
//! mark with an internal placeholder token `TOKEN_<12-hex>_CHECKED` /
//! `TOKEN_<12-hex>_UNCHECKED`; placeholders never reach the remote store.

use smol_str::SmolStr;

use crate::error::SyncError;
use crate::ident::{ID_LEN, is_id, unique_id};

const TOKEN_PREFIX: &str = "TOKEN_";
const STATE_CHECKED: &str = "CHECKED";
const STATE_UNCHECKED: &str = "UNCHECKED";

/// One placeholder token: the checkbox id plus its checked state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub id: SmolStr,
    pub checked: bool,
}

impl Placeholder {
    /// Allocate a placeholder with a fresh id.
    pub fn fresh(checked: bool) -> Self {
        Self {
            id: unique_id(),
            checked,
        }
    }

    /// The token as it appears in tagged text.
    pub fn token(&self) -> String {
        let state = if self.checked {
            STATE_CHECKED
        } else {
            STATE_UNCHECKED
        };
        format!("{}{}_{}", TOKEN_PREFIX, self.id, state)
    }

    /// The canonical raw mark this placeholder resolves back to.
    ///
    /// Always the Latin form, regardless of what was scanned on input.
    pub fn raw_mark(&self) -> &'static str {
        if self.checked { "_[x]" } else { "_[ ]" }
    }
}

// === Raw mark scanning ===

/// A raw mark occurrence in un-tokenized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMark {
    /// Byte offset of the leading `_`.
    pub start: usize,
    /// Byte length of the mark (5 for the Cyrillic form, 4 otherwise).
    pub len: usize,
    pub checked: bool,
}

/// Find the leftmost raw mark of either kind.
///
/// Checked and unchecked marks are scanned together in source order, so
/// checkbox ids are always assigned left to right.
pub fn find_raw_mark(text: &str) -> Option<RawMark> {
    let mut from = 0;
    while let Some(pos) = text[from..].find("_[") {
        let start = from + pos;
        let rest = &text[start + 2..];
        let mut chars = rest.chars();
        match chars.next() {
            Some(c @ (' ' | 'x' | 'х')) if chars.next() == Some(']') => {
                return Some(RawMark {
                    start,
                    len: 2 + c.len_utf8() + 1,
                    checked: c != ' ',
                });
            }
            _ => from = start + 2,
        }
    }
    None
}

/// List every raw mark in a string, with absolute byte offsets.
pub fn raw_marks(text: &str) -> Vec<RawMark> {
    let mut out = Vec::new();
    let mut offset = 0;
    while let Some(mark) = find_raw_mark(&text[offset..]) {
        let absolute = RawMark {
            start: offset + mark.start,
            ..mark
        };
        offset = absolute.start + absolute.len;
        out.push(absolute);
    }
    out
}

/// Count raw marks remaining in a string.
pub fn count_raw_marks(text: &str) -> usize {
    let mut rest = text;
    let mut count = 0;
    while let Some(mark) = find_raw_mark(rest) {
        count += 1;
        rest = &rest[mark.start + mark.len..];
    }
    count
}

// === Tokenization ===

/// Result of tokenizing a string: the tagged text and the placeholders
/// created for each raw mark, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeOutcome {
    pub tagged: String,
    pub created: Vec<Placeholder>,
}

/// Replace every raw mark with a fresh placeholder token.
///
/// Idempotent on already-tokenized input: placeholder tokens contain no raw
/// mark, so a second pass creates nothing and returns the input unchanged.
pub fn tokenize(text: &str) -> TokenizeOutcome {
    let mut tagged = String::with_capacity(text.len());
    let mut created = Vec::new();
    let mut rest = text;

    while let Some(mark) = find_raw_mark(rest) {
        let ph = Placeholder::fresh(mark.checked);
        tagged.push_str(&rest[..mark.start]);
        tagged.push_str(&ph.token());
        created.push(ph);
        rest = &rest[mark.start + mark.len..];
    }
    tagged.push_str(rest);

    TokenizeOutcome { tagged, created }
}

/// Tokenize a second representation of the same text, reusing an existing
/// placeholder sequence so both strings carry the same checkbox ids.
///
/// The caller's sequence wins on state as well as id: the i-th raw mark is
/// replaced by the i-th placeholder verbatim. Unequal occurrence counts are
/// a tokenization skew and reported as an error, not repaired.
pub fn tokenize_lockstep(text: &str, seq: &[Placeholder]) -> Result<String, SyncError> {
    let found = count_raw_marks(text);
    if found != seq.len() {
        return Err(SyncError::TokenizeSkew {
            expected: seq.len(),
            found,
        });
    }

    let mut tagged = String::with_capacity(text.len());
    let mut rest = text;
    for ph in seq {
        // count_raw_marks established there are exactly seq.len() marks
        let mark = match find_raw_mark(rest) {
            Some(m) => m,
            None => break,
        };
        tagged.push_str(&rest[..mark.start]);
        tagged.push_str(&ph.token());
        rest = &rest[mark.start + mark.len..];
    }
    tagged.push_str(rest);

    Ok(tagged)
}

// === Placeholder scanning ===

/// Find the leftmost placeholder token, returning its byte range and parse.
pub fn find_placeholder(text: &str) -> Option<(std::ops::Range<usize>, Placeholder)> {
    let mut from = 0;
    while let Some(pos) = text[from..].find(TOKEN_PREFIX) {
        let start = from + pos;
        let after_prefix = start + TOKEN_PREFIX.len();
        if let Some(id) = text.get(after_prefix..after_prefix + ID_LEN) {
            if is_id(id) {
                let after_id = after_prefix + ID_LEN;
                let tail = &text[after_id..];
                let (checked, state_len) = if let Some(t) = tail.strip_prefix('_') {
                    if t.starts_with(STATE_UNCHECKED) {
                        (Some(false), 1 + STATE_UNCHECKED.len())
                    } else if t.starts_with(STATE_CHECKED) {
                        (Some(true), 1 + STATE_CHECKED.len())
                    } else {
                        (None, 0)
                    }
                } else {
                    (None, 0)
                };
                if let Some(checked) = checked {
                    return Some((
                        start..after_id + state_len,
                        Placeholder {
                            id: SmolStr::new(id),
                            checked,
                        },
                    ));
                }
            }
        }
        from = start + TOKEN_PREFIX.len();
    }
    None
}

/// List every placeholder in a tagged string, in source order.
pub fn placeholders(text: &str) -> Vec<Placeholder> {
    let mut out = Vec::new();
    let mut offset = 0;
    while let Some((range, ph)) = find_placeholder(&text[offset..]) {
        offset += range.end;
        out.push(ph);
    }
    out
}

/// Resolve every placeholder back to its canonical raw mark.
///
/// Exact inverse of `tokenize` when no toggles occurred and the input used
/// Latin marks; Cyrillic input comes back normalized.
pub fn detokenize(tagged: &str) -> String {
    let mut out = String::with_capacity(tagged.len());
    let mut offset = 0;
    while let Some((range, ph)) = find_placeholder(&tagged[offset..]) {
        out.push_str(&tagged[offset..offset + range.start]);
        out.push_str(ph.raw_mark());
        offset += range.end;
    }
    out.push_str(&tagged[offset..]);
    out
}

/// Rewrite the placeholder with the given id to carry a new checked state.
///
/// Returns false when no placeholder with that id exists in the string.
pub fn set_placeholder_state(tagged: &mut String, id: &str, checked: bool) -> bool {
    let mut offset = 0;
    while let Some((range, ph)) = find_placeholder(&tagged[offset..]) {
        let abs = offset + range.start..offset + range.end;
        if ph.id == id {
            let replacement = Placeholder {
                id: ph.id,
                checked,
            }
            .token();
            tagged.replace_range(abs, &replacement);
            return true;
        }
        offset += range.end;
    }
    false
}
