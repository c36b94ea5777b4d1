//! Byte/char/line conversions over a `&str` snapshot.
//!
//! Regex matches report byte offsets; everything public in this crate speaks character
//! offsets and zero-based line numbers.

#[derive(Debug)]
pub(crate) struct CharIndex {
    char_to_byte: Vec<usize>,
    /// Byte offset at which each line after the first begins.
    line_start_bytes: Vec<usize>,
    text_len: usize,
}

/// Single-character line breaks, the same set the rope buffer counts. `\r\n` is one break.
pub(crate) fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = Vec::with_capacity(text.len() + 1);
        let mut line_start_bytes = Vec::new();
        let mut chars = text.char_indices().peekable();
        while let Some((b, ch)) = chars.next() {
            char_to_byte.push(b);
            if ch == '\r' && chars.peek().is_some_and(|&(_, next)| next == '\n') {
                continue;
            }
            if is_line_break(ch) {
                line_start_bytes.push(b + ch.len_utf8());
            }
        }
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            line_start_bytes,
            text_len: text.len(),
        }
    }

    pub(crate) fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    pub(crate) fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        self.char_to_byte
            .get(clamped)
            .copied()
            .unwrap_or(self.text_len)
    }

    pub(crate) fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }

    /// Zero-based line containing `byte_offset`.
    pub(crate) fn line_of_byte(&self, byte_offset: usize) -> usize {
        self.line_start_bytes
            .partition_point(|&start| start <= byte_offset)
    }
}

/// Number of line breaks in `text`, counting `\r\n` once.
pub(crate) fn line_break_count(text: &str) -> usize {
    text.matches(is_line_break).count() - text.matches("\r\n").count()
}

/// Leading whitespace (spaces and tabs) of `line`.
pub(crate) fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

/// Display width of `line`'s leading whitespace with tabs advancing to the next tab stop.
pub(crate) fn indentation_width(line: &str, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    leading_whitespace(line).chars().fold(0, |col, ch| {
        if ch == '\t' {
            (col / tab_width + 1) * tab_width
        } else {
            col + 1
        }
    })
}

/// Returns `true` if the character at `byte_offset` is preceded on its line by an unescaped `%`.
pub(crate) fn is_commented(text: &str, byte_offset: usize) -> bool {
    let line_start = text[..byte_offset]
        .char_indices()
        .rev()
        .find(|&(_, ch)| is_line_break(ch))
        .map_or(0, |(idx, ch)| idx + ch.len_utf8());
    let mut escaped = false;
    for ch in text[line_start..byte_offset].chars() {
        match ch {
            '\\' => escaped = !escaped,
            '%' if !escaped => return true,
            _ => escaped = false,
        }
    }
    false
}
