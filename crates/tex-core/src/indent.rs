//! Per-line indentation widths, maintained incrementally.
//!
//! Unlike symbols and blocks, the width table is not rebuilt on every edit: only the lines an
//! edit touched are recomputed and spliced into the table. The result always equals a full
//! recompute over the current text.

use crate::buffer::TextBuffer;
use crate::edit::Edit;
use crate::text::indentation_width;

/// Indentation width of every line of one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentGuides {
    tab_width: usize,
    widths: Vec<usize>,
}

impl IndentGuides {
    /// Compute widths for every line of `buffer`.
    pub fn new(buffer: &TextBuffer, tab_width: usize) -> Self {
        let mut guides = Self {
            tab_width,
            widths: Vec::new(),
        };
        guides.recompute(buffer);
        guides
    }

    /// Width of `line`, if it exists.
    pub fn width(&self, line: usize) -> Option<usize> {
        self.widths.get(line).copied()
    }

    /// `(line, width)` for lines with a non-zero width.
    pub fn guides(&self) -> Vec<(usize, usize)> {
        self.widths
            .iter()
            .enumerate()
            .filter(|(_, width)| **width > 0)
            .map(|(line, width)| (line, *width))
            .collect()
    }

    /// Full recompute.
    pub fn recompute(&mut self, buffer: &TextBuffer) {
        self.widths = (0..buffer.line_count())
            .map(|line| self.line_width(buffer, line))
            .collect();
    }

    /// Update the table after `edit` was applied to `buffer`.
    pub fn on_edit(&mut self, edit: &Edit, buffer: &TextBuffer) {
        // The edit offset is unchanged by the edit itself, so its line is the first touched one
        // both before and after.
        let first = buffer.line_of_offset(edit.offset());
        let newlines = edit.newline_count();
        let (old_span, new_span) = match edit {
            Edit::Insert { .. } => (1, newlines + 1),
            Edit::Delete { .. } => (newlines + 1, 1),
        };

        if first + old_span > self.widths.len()
            || self.widths.len() - old_span + new_span != buffer.line_count()
        {
            self.recompute(buffer);
            return;
        }

        let fresh: Vec<usize> = (first..first + new_span)
            .map(|line| self.line_width(buffer, line))
            .collect();
        self.widths.splice(first..first + old_span, fresh);
    }

    fn line_width(&self, buffer: &TextBuffer, line: usize) -> usize {
        buffer
            .line_text(line)
            .map_or(0, |text| indentation_width(&text, self.tab_width))
    }
}
