//! Fuzzy mapping of an external `(line, word, context)` locator onto buffer ranges.
//!
//! Forward search from a PDF viewer reports the line plus the word under the pointer and some
//! surrounding text, possibly with mangled non-ASCII characters and hyphenation. Each
//! occurrence of the word on the line is scored by how similar its surroundings are to the
//! reported context; near-ties are all returned.

use regex::Regex;
use similar::TextDiff;
use std::ops::Range;
use tracing::debug;

use crate::document::Document;
use crate::error::{DocumentError, LocateError};
use crate::text::{CharIndex, leading_whitespace};

/// Initial best score; candidates must beat this by the margin to be kept.
const SCORE_FLOOR: f32 = 0.1;
/// Scores closer than this to the best are kept as ties.
const SCORE_MARGIN: f32 = 0.1;
/// Only the first tokens of the reported word are matched.
const MAX_WORD_TOKENS: usize = 2;

/// Best-matching ranges of `word` in `line_text`, as character offsets into the line.
///
/// Returns an empty list on empty input or when nothing matches; use [`try_locate`] to tell the
/// two apart.
pub fn locate(line_text: &str, word: &str, context: &str) -> Vec<Range<usize>> {
    try_locate(line_text, word, context).unwrap_or_default()
}

/// Like [`locate`], but rejects an empty word.
pub fn try_locate(
    line_text: &str,
    word: &str,
    context: &str,
) -> Result<Vec<Range<usize>>, LocateError> {
    if word.is_empty() {
        return Err(LocateError::EmptyWord);
    }

    let word = word
        .split(' ')
        .take(MAX_WORD_TOKENS)
        .collect::<Vec<_>>()
        .join(" ");
    let pattern = format!(r"(\W?){}(\W?)", word_pattern(&word));
    let regex = match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(err) => {
            debug!("locator pattern rejected: {err}");
            return Ok(Vec::new());
        }
    };

    // Window around each occurrence: as much text before and after it as the context has
    // around the word.
    let word_len = word.chars().count() as isize;
    let context_len = context.chars().count() as isize;
    let word_in_context = context
        .find(&word)
        .map_or(-1, |byte| context[..byte].chars().count() as isize);
    let before = word_in_context.max(0) as usize;
    let after = (context_len - word_in_context - word_len).max(0) as usize;

    let index = CharIndex::new(line_text);
    let mut top_score = SCORE_FLOOR;
    let mut matches = Vec::new();

    for caps in regex.captures_iter(line_text) {
        let (Some(whole), Some(lead), Some(trail)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        if lead.is_empty() && trail.is_empty() {
            continue;
        }

        let start = index.byte_to_char(whole.start());
        let end = index.byte_to_char(whole.end());
        let window_start = index.char_to_byte(start.saturating_sub(before));
        let window_end = index.char_to_byte(end.saturating_add(after));
        let window = &line_text[window_start..window_end];
        let score = TextDiff::from_chars(window, context).ratio();

        let range = start + lead.as_str().chars().count()..end - trail.as_str().chars().count();
        if score > top_score + SCORE_MARGIN {
            top_score = score;
            matches = vec![range];
        } else if score > top_score - SCORE_MARGIN {
            matches.push(range);
        }
    }

    Ok(matches)
}

/// Regex source for `word`: literal except that non-ASCII characters match any word
/// character, hyphens are optional, and the control characters some viewers substitute for
/// ligatures match short runs of word characters.
fn word_pattern(word: &str) -> String {
    let mut pattern = String::with_capacity(word.len() * 2);
    let mut buf = [0u8; 4];
    for ch in word.chars() {
        match ch {
            '\x1b' | '\x1d' => pattern.push_str(r"(?:\w{2,3})"),
            '\x1c' => pattern.push_str(r"(?:\w{2})"),
            '-' => pattern.push_str("(?:-{0,1})"),
            c if !c.is_ascii() => pattern.push_str(r"(?:\w)"),
            c => pattern.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    pattern
}

/// Character ranges in `document` to highlight for a forward-search request.
///
/// When the word cannot be located the whole line is returned, starting after its leading
/// whitespace.
pub fn forward_search(
    document: &Document,
    line: usize,
    word: &str,
    context: &str,
) -> Result<Vec<Range<usize>>, DocumentError> {
    let buffer = document.buffer();
    let line_text = buffer
        .line_text(line)
        .ok_or(DocumentError::LineOutOfRange {
            line,
            line_count: buffer.line_count(),
        })?;
    let line_start = buffer.line_start(line);

    let ranges = locate(&line_text, word, context);
    if ranges.is_empty() {
        let indent = leading_whitespace(&line_text).chars().count();
        let len = line_text.chars().count();
        return Ok(vec![line_start + indent..line_start + len]);
    }

    Ok(ranges
        .into_iter()
        .map(|r| line_start + r.start..line_start + r.end)
        .collect())
}
