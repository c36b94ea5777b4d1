//! Rope-backed text buffer with named marks and edit notifications.
//!
//! All offsets are character offsets in `[0, len_chars()]`. Each primitive mutation produces
//! one [`Edit`], applies it to every mark and hands it to every subscriber before returning.

use ropey::Rope;
use std::collections::BTreeMap;

use crate::edit::Edit;
use crate::error::DocumentError;
use crate::text::is_line_break;

/// Which side of an insertion made exactly at a mark the mark ends up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    /// The mark stays before text inserted at its offset.
    #[default]
    Left,
    /// The mark moves past text inserted at its offset.
    Right,
}

/// A named position that follows edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    /// Current character offset.
    pub offset: usize,
    /// Insertion gravity.
    pub gravity: Gravity,
}

/// Edit subscriber callback type.
pub type EditCallback = Box<dyn FnMut(&Edit) + Send>;

/// The mutable character sequence of one document.
pub struct TextBuffer {
    rope: Rope,
    marks: BTreeMap<String, Mark>,
    callbacks: Vec<EditCallback>,
    version: u64,
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field("len_chars", &self.rope.len_chars())
            .field("line_count", &self.rope.len_lines())
            .field("marks", &self.marks)
            .field("subscribers", &self.callbacks.len())
            .field("version", &self.version)
            .finish()
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextBuffer {
    /// Create a buffer holding `text`.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            marks: BTreeMap::new(),
            callbacks: Vec::new(),
            version: 0,
        }
    }

    /// Total character count.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Number of lines (an empty buffer has one line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Incremented once per emitted [`Edit`].
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Complete text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text of `start..end` (character offsets, clamped to the buffer).
    pub fn slice(&self, start: usize, end: usize) -> String {
        let len = self.rope.len_chars();
        let end = end.min(len);
        let start = start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Character at `offset`, if any.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset < self.rope.len_chars() {
            Some(self.rope.char(offset))
        } else {
            None
        }
    }

    /// Text of `line` without its line break.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(line).to_string();
        if text.ends_with(is_line_break) && text.pop() == Some('\n') && text.ends_with('\r') {
            text.pop();
        }
        Some(text)
    }

    /// Zero-based line containing `offset` (clamped to the buffer).
    pub fn line_of_offset(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// Character offset of the first character of `line` (clamped to the buffer end).
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(line)
    }

    /// Character offset of the end of `line`, before its line break.
    pub fn line_end(&self, line: usize) -> usize {
        let start = self.line_start(line);
        let len = self
            .line_text(line)
            .map_or(0, |text| text.chars().count());
        start + len
    }

    /// Character offset for a `(line, column)` pair; the column is clamped to the line length.
    pub fn position_to_offset(&self, line: usize, column: usize) -> Result<usize, DocumentError> {
        let Some(text) = self.line_text(line) else {
            return Err(DocumentError::LineOutOfRange {
                line,
                line_count: self.rope.len_lines(),
            });
        };
        Ok(self.rope.line_to_char(line) + column.min(text.chars().count()))
    }

    /// Subscribe to edit notifications. Callbacks run synchronously inside the mutating call.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&Edit) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Create or move a named mark.
    pub fn set_mark(
        &mut self,
        name: impl Into<String>,
        offset: usize,
        gravity: Gravity,
    ) -> Result<(), DocumentError> {
        self.check_offset(offset)?;
        self.marks.insert(name.into(), Mark { offset, gravity });
        Ok(())
    }

    /// Current offset of a named mark.
    pub fn mark(&self, name: &str) -> Option<usize> {
        self.marks.get(name).map(|m| m.offset)
    }

    /// Remove a named mark, returning its last offset.
    pub fn remove_mark(&mut self, name: &str) -> Option<usize> {
        self.marks.remove(name).map(|m| m.offset)
    }

    /// Insert `text` at `offset`.
    ///
    /// Returns `Ok(None)` without notifying anyone when `text` is empty.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<Option<Edit>, DocumentError> {
        self.check_offset(offset)?;
        if text.is_empty() {
            return Ok(None);
        }
        self.rope.insert(offset, text);
        let edit = Edit::Insert {
            offset,
            text: text.to_string(),
        };
        self.publish(&edit);
        Ok(Some(edit))
    }

    /// Delete `len` characters starting at `offset`.
    pub fn delete(&mut self, offset: usize, len: usize) -> Result<Option<Edit>, DocumentError> {
        let end = offset.saturating_add(len);
        self.check_range(offset, end)?;
        if len == 0 {
            return Ok(None);
        }
        let deleted = self.rope.slice(offset..end).to_string();
        self.rope.remove(offset..end);
        let edit = Edit::Delete { offset, deleted };
        self.publish(&edit);
        Ok(Some(edit))
    }

    /// Replace `len` characters at `offset` with `text`: one delete followed by one insert.
    pub fn replace(
        &mut self,
        offset: usize,
        len: usize,
        text: &str,
    ) -> Result<Vec<Edit>, DocumentError> {
        self.check_range(offset, offset.saturating_add(len))?;
        let mut edits = Vec::with_capacity(2);
        edits.extend(self.delete(offset, len)?);
        edits.extend(self.insert(offset, text)?);
        Ok(edits)
    }

    fn publish(&mut self, edit: &Edit) {
        self.version += 1;
        for mark in self.marks.values_mut() {
            mark.offset = edit.map_offset(mark.offset, mark.gravity == Gravity::Right);
        }
        for callback in &mut self.callbacks {
            callback(edit);
        }
    }

    fn check_offset(&self, offset: usize) -> Result<(), DocumentError> {
        let len = self.rope.len_chars();
        if offset > len {
            return Err(DocumentError::OffsetOutOfRange { offset, len });
        }
        Ok(())
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), DocumentError> {
        let len = self.rope.len_chars();
        if start > end || end > len {
            return Err(DocumentError::RangeOutOfRange { start, end, len });
        }
        Ok(())
    }
}
