//! Line comment toggling.

use std::ops::Range;

use crate::document::Document;
use crate::error::DocumentError;
use crate::text::leading_whitespace;

impl Document {
    /// Lines covered by `selection`: the cursor line when it is empty, otherwise every line it
    /// touches except a last line it only reaches at column 0.
    pub fn selected_lines(&self, selection: Range<usize>) -> Range<usize> {
        let buffer = self.buffer();
        let first = buffer.line_of_offset(selection.start);
        if selection.is_empty() {
            return first..first + 1;
        }
        let last = buffer.line_of_offset(selection.end);
        if buffer.line_start(last) == selection.end.min(buffer.len_chars()) {
            first..last.max(first + 1)
        } else {
            first..last + 1
        }
    }

    /// Comment or uncomment the lines under `selection`.
    ///
    /// If any line is not commented, the comment token is inserted at column 0 of every line;
    /// otherwise the first token after each line's indentation is removed. Returns `Some(true)`
    /// when lines were commented, `Some(false)` when uncommented, and `None` when the language
    /// has no line comments.
    pub fn toggle_comment(&mut self, selection: Range<usize>) -> Result<Option<bool>, DocumentError> {
        let comment = self.language().comment_config();
        let Some(token) = comment.line.filter(|token| !token.is_empty()) else {
            return Ok(None);
        };
        let lines = self.selected_lines(selection);

        let do_comment = lines.clone().any(|line| {
            self.buffer().line_text(line).is_some_and(|text| {
                !text[leading_whitespace(&text).len()..].starts_with(token.as_str())
            })
        });

        for line in lines {
            let start = self.buffer().line_start(line);
            if do_comment {
                self.insert(start, &token)?;
            } else {
                let text = self.buffer().line_text(line).unwrap_or_default();
                let indent = leading_whitespace(&text).chars().count();
                self.delete(start + indent, token.chars().count())?;
            }
        }

        Ok(Some(do_comment))
    }
}

#[cfg(test)]
mod tests {
    use crate::document::Document;

    #[test]
    fn comments_when_any_line_is_uncommented() {
        let mut doc = Document::new("a\n% b\n  c\nd");
        assert_eq!(doc.toggle_comment(0..8).unwrap(), Some(true));
        assert_eq!(doc.text(), "%a\n%% b\n%  c\nd");
    }

    #[test]
    fn uncomments_after_indentation() {
        let mut doc = Document::new("%a\n  % b\nc");
        assert_eq!(doc.toggle_comment(0..5).unwrap(), Some(false));
        assert_eq!(doc.text(), "a\n   b\nc");
    }

    #[test]
    fn indentation_is_spaces_and_tabs_only() {
        let original = "\u{a0}%a\n\t%b";
        let mut doc = Document::new(original);
        assert_eq!(doc.toggle_comment(0..6).unwrap(), Some(true));
        assert_eq!(doc.text(), "%\u{a0}%a\n%\t%b");
        assert_eq!(doc.toggle_comment(0..8).unwrap(), Some(false));
        assert_eq!(doc.text(), original);
    }

    #[test]
    fn selection_ending_at_column_zero_skips_that_line() {
        let doc = Document::new("a\nb\nc");
        assert_eq!(doc.selected_lines(0..2), 0..1);
        assert_eq!(doc.selected_lines(0..3), 0..2);
        assert_eq!(doc.selected_lines(3..3), 1..2);
    }

    #[test]
    fn cursor_line_only() {
        let mut doc = Document::new("x\ny");
        doc.toggle_comment(2..2).unwrap();
        assert_eq!(doc.text(), "x\n%y");
        doc.toggle_comment(3..3).unwrap();
        assert_eq!(doc.text(), "x\ny");
    }
}
