//! Completion context detection.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::document::Document;

/// Marker spliced into the line at the cursor before matching.
const CURSOR_MARKER: &str = "%•%";

static BEGIN_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*\\(begin|end)\{((?:[^\{\[\(])*)%•%((?:[^\{\[\(])*)\}.*")
        .expect("valid begin/end regex")
});

/// Column range of the environment name around `column` when the cursor is inside the braces
/// of `\begin{..}` or `\end{..}` on `line`.
pub fn begin_end_word_at(line: &str, column: usize) -> Option<Range<usize>> {
    let split = line
        .char_indices()
        .nth(column)
        .map_or(line.len(), |(byte, _)| byte);
    let marked = format!("{}{CURSOR_MARKER}{}", &line[..split], &line[split..]);

    let caps = BEGIN_END.captures(&marked)?;
    let before = caps.get(2)?.as_str().chars().count();
    let after = caps.get(3)?.as_str().chars().count();
    let start = column.checked_sub(before)?;
    Some(start..column + after)
}

impl Document {
    /// Document range of the environment name under `cursor`, see [`begin_end_word_at`].
    pub fn begin_end_word_at(&self, cursor: usize) -> Option<Range<usize>> {
        let buffer = self.buffer();
        let line = buffer.line_of_offset(cursor);
        let line_start = buffer.line_start(line);
        let text = buffer.line_text(line)?;
        let range = begin_end_word_at(&text, cursor - line_start)?;
        Some(line_start + range.start..line_start + range.end)
    }
}
