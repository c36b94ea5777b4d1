//! Structured buffer change events.
//!
//! Every mutation of a [`TextBuffer`](crate::TextBuffer) produces exactly one [`Edit`] per
//! primitive operation, synchronously and in full. Offsets are **character offsets** (Unicode
//! scalar values), never bytes.

use crate::text::line_break_count;

/// The kind of a buffer mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Text was inserted.
    Insert,
    /// Text was removed.
    Delete,
}

/// A single primitive change to a buffer.
///
/// Semantics:
/// - `offset` is a character offset in the document **before** the edit is applied.
/// - Inserts carry the inserted text; deletes carry the removed text so that consumers can
///   tell how many lines disappeared without re-reading the old document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// `text` was inserted at `offset`.
    Insert {
        /// Insertion point.
        offset: usize,
        /// Inserted text.
        text: String,
    },
    /// The characters `offset..offset + deleted.chars().count()` were removed.
    Delete {
        /// Start of the removed span.
        offset: usize,
        /// Exact removed text.
        deleted: String,
    },
}

impl Edit {
    /// The edit kind.
    pub fn kind(&self) -> EditKind {
        match self {
            Self::Insert { .. } => EditKind::Insert,
            Self::Delete { .. } => EditKind::Delete,
        }
    }

    /// Start offset of the edit.
    pub fn offset(&self) -> usize {
        match self {
            Self::Insert { offset, .. } | Self::Delete { offset, .. } => *offset,
        }
    }

    /// The inserted or deleted text.
    pub fn text(&self) -> &str {
        match self {
            Self::Insert { text, .. } => text,
            Self::Delete { deleted, .. } => deleted,
        }
    }

    /// Number of characters inserted or deleted.
    pub fn len(&self) -> usize {
        self.text().chars().count()
    }

    /// Returns `true` if the edit does not change the buffer.
    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    /// Exclusive end of the affected span: in the new document for inserts, in the old one for
    /// deletes.
    pub fn end(&self) -> usize {
        self.offset().saturating_add(self.len())
    }

    /// Number of line breaks in the inserted or deleted text.
    pub fn newline_count(&self) -> usize {
        line_break_count(self.text())
    }

    /// Map an offset taken before this edit to the equivalent offset after it.
    ///
    /// `stick_right` decides where an offset sitting exactly at an insertion point ends up:
    /// `false` keeps it before the inserted text, `true` moves it past. Offsets inside a
    /// deleted span collapse to the start of the span.
    pub fn map_offset(&self, offset: usize, stick_right: bool) -> usize {
        match self {
            Self::Insert { offset: at, .. } => {
                if offset > *at || (offset == *at && stick_right) {
                    offset.saturating_add(self.len())
                } else {
                    offset
                }
            }
            Self::Delete { offset: at, .. } => {
                let end = self.end();
                if offset <= *at {
                    offset
                } else if offset < end {
                    *at
                } else {
                    offset - self.len()
                }
            }
        }
    }
}
