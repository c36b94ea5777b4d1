//! Placeholder (`•`) selection when the cursor moves onto a placeholder run.

use std::ops::Range;

use crate::buffer::TextBuffer;

/// The placeholder character inserted by snippets.
pub const PLACEHOLDER: char = '•';

/// Remembers the previous cursor position to decide whether a cursor move should select the
/// placeholder run it landed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceholderTracker {
    last_cursor: usize,
}

impl PlaceholderTracker {
    /// Create a tracker with the cursor at the start of the document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a cursor position. Returns the placeholder run to select, if any.
    ///
    /// A run is selected when the cursor sits on it or directly after it, unless the cursor just
    /// stepped out of the run across its far edge (so the user can move past a placeholder).
    pub fn cursor_moved(
        &mut self,
        buffer: &TextBuffer,
        cursor: usize,
        has_selection: bool,
    ) -> Option<Range<usize>> {
        if cursor == self.last_cursor {
            return None;
        }

        let mut selection = None;
        if !has_selection {
            if buffer.char_at(cursor) == Some(PLACEHOLDER) {
                let run = placeholder_run(buffer, cursor);
                if self.last_cursor != cursor + run.len() {
                    selection = Some(run);
                }
            } else if let Some(before) = cursor.checked_sub(1)
                && buffer.char_at(before) == Some(PLACEHOLDER)
            {
                let run = placeholder_run(buffer, before);
                if cursor.checked_sub(run.len()) != Some(self.last_cursor) {
                    selection = Some(run);
                }
            }
        }

        self.last_cursor = cursor;
        selection
    }
}

/// The maximal run of placeholder characters containing `offset`.
pub fn placeholder_run(buffer: &TextBuffer, offset: usize) -> Range<usize> {
    let mut start = offset;
    while let Some(prev) = start.checked_sub(1)
        && buffer.char_at(prev) == Some(PLACEHOLDER)
    {
        start = prev;
    }
    let mut end = offset;
    while buffer.char_at(end) == Some(PLACEHOLDER) {
        end += 1;
    }
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_run_under_cursor() {
        let buffer = TextBuffer::new("\\frac{••}{•}");
        let mut tracker = PlaceholderTracker::new();
        assert_eq!(tracker.cursor_moved(&buffer, 6, false), Some(6..8));
        assert_eq!(tracker.cursor_moved(&buffer, 6, false), None);
    }

    #[test]
    fn selects_run_before_cursor() {
        let buffer = TextBuffer::new("a • b");
        let mut tracker = PlaceholderTracker::new();
        assert_eq!(tracker.cursor_moved(&buffer, 3, false), Some(2..3));
    }

    #[test]
    fn stepping_over_the_edge_does_not_select() {
        let buffer = TextBuffer::new("a • b");
        let mut tracker = PlaceholderTracker::new();
        tracker.cursor_moved(&buffer, 2, false);
        // Leaving the run forward or backward across its edge keeps the cursor free.
        assert_eq!(tracker.cursor_moved(&buffer, 3, false), None);
        assert_eq!(tracker.cursor_moved(&buffer, 2, false), None);
        // Arriving from elsewhere selects it again.
        assert_eq!(tracker.cursor_moved(&buffer, 4, false), None);
        assert_eq!(tracker.cursor_moved(&buffer, 3, false), Some(2..3));
    }

    #[test]
    fn existing_selection_wins() {
        let buffer = TextBuffer::new("••");
        let mut tracker = PlaceholderTracker::new();
        assert_eq!(tracker.cursor_moved(&buffer, 1, true), None);
        assert_eq!(tracker.cursor_moved(&buffer, 0, false), Some(0..2));
    }
}
