//! Lexical block extraction: sectioning commands and file inclusions.
//!
//! Blocks are produced in document order (ascending `start_offset`); the outline builder
//! depends on that ordering. Like the symbol index, the block list is rebuilt from the complete
//! text on every edit.

use regex::Regex;
use std::sync::LazyLock;
use tex_core_lang::{FILE_LEVEL, is_inclusion_command, sectioning_level};
use tracing::debug;

use crate::edit::Edit;
use crate::text::{CharIndex, is_commented};

/// What a [`Block`] marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `\part`
    Part,
    /// `\chapter`
    Chapter,
    /// `\section`
    Section,
    /// `\subsection`
    Subsection,
    /// `\subsubsection`
    Subsubsection,
    /// `\paragraph`
    Paragraph,
    /// `\subparagraph`
    Subparagraph,
    /// `\input` / `\include`; the captured text is the referenced file name.
    Include,
    /// Synthetic placeholder for an included file that is not open.
    File,
}

impl BlockKind {
    /// Map a command name (without backslash or star) to a block kind.
    pub fn from_command(command: &str) -> Option<Self> {
        if is_inclusion_command(command) {
            return Some(Self::Include);
        }
        Some(match sectioning_level(command)? {
            0 => Self::Part,
            1 => Self::Chapter,
            2 => Self::Section,
            3 => Self::Subsection,
            4 => Self::Subsubsection,
            5 => Self::Paragraph,
            _ => Self::Subparagraph,
        })
    }

    /// Outline nesting level; `None` for kinds that never appear in the outline.
    pub fn level(self) -> Option<u8> {
        match self {
            Self::Part => Some(0),
            Self::Chapter => Some(1),
            Self::Section => Some(2),
            Self::Subsection => Some(3),
            Self::Subsubsection => Some(4),
            Self::Paragraph => Some(5),
            Self::Subparagraph => Some(6),
            Self::File => Some(FILE_LEVEL),
            Self::Include => None,
        }
    }

    /// Lower-case name (`"section"`, `"file"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Self::Part => "part",
            Self::Chapter => "chapter",
            Self::Section => "section",
            Self::Subsection => "subsection",
            Self::Subsubsection => "subsubsection",
            Self::Paragraph => "paragraph",
            Self::Subparagraph => "subparagraph",
            Self::Include => "include",
            Self::File => "file",
        }
    }

    /// Symbolic icon name for outline rows.
    pub fn icon_name(self) -> String {
        format!("{}-symbolic", self.name())
    }
}

/// A lexical marker with its position and captured argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Character offset of the command's backslash.
    pub start_offset: usize,
    /// Character offset just past the block (after the closing brace when there is one).
    pub end_offset: usize,
    /// Zero-based line of `start_offset`.
    pub start_line: usize,
    /// Zero-based line of `end_offset`.
    pub end_line: usize,
    /// Marker kind.
    pub kind: BlockKind,
    /// Braced argument (title or file name); empty when there is none.
    pub captured_text: String,
}

impl Block {
    /// Synthetic placeholder for an included file that is not open.
    pub fn file_placeholder(filename: impl Into<String>) -> Self {
        Self {
            start_offset: 0,
            end_offset: 0,
            start_line: 0,
            end_line: 0,
            kind: BlockKind::File,
            captured_text: filename.into(),
        }
    }
}

static COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([A-Za-z@]+)\*?").expect("valid command regex"));

/// Maintains the ordered block list for one document.
#[derive(Debug, Clone)]
pub struct BlockExtractor {
    command: Regex,
    blocks: Vec<Block>,
}

impl Default for BlockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockExtractor {
    /// Create an extractor with an empty block list.
    pub fn new() -> Self {
        Self {
            command: COMMAND.clone(),
            blocks: Vec::new(),
        }
    }

    /// Current blocks in document order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// React to an edit; `text` is the complete text after the edit.
    pub fn on_edit(&mut self, _edit: &Edit, text: &str) {
        self.rescan(text);
    }

    /// Rebuild the block list from `text`.
    pub fn rescan(&mut self, text: &str) {
        self.blocks = self.extract(text);
        debug!(blocks = self.blocks.len(), "block list rebuilt");
    }

    /// Extract blocks from `text` without touching the stored list.
    pub fn extract(&self, text: &str) -> Vec<Block> {
        let index = CharIndex::new(text);
        let mut blocks = Vec::new();

        for caps in self.command.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(kind) = BlockKind::from_command(name.as_str()) else {
                continue;
            };
            if is_commented(text, whole.start()) {
                continue;
            }

            let (captured_text, end_byte) = match braced_argument(text, whole.end()) {
                Some((inner, end)) => (inner.to_string(), end),
                None => (String::new(), whole.end()),
            };
            if kind == BlockKind::Include && captured_text.trim().is_empty() {
                continue;
            }

            blocks.push(Block {
                start_offset: index.byte_to_char(whole.start()),
                end_offset: index.byte_to_char(end_byte),
                start_line: index.line_of_byte(whole.start()),
                end_line: index.line_of_byte(end_byte),
                kind,
                captured_text,
            });
        }

        blocks
    }
}

/// Parse `[optional]{argument}` starting at byte `from`.
///
/// Returns the argument's inner text and the byte offset past its closing brace. Nested groups
/// and escaped braces inside the argument are kept intact.
fn braced_argument(text: &str, from: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    let mut pos = skip_whitespace(bytes, from);

    if bytes.get(pos) == Some(&b'[') {
        pos = skip_whitespace(bytes, matching_close(bytes, pos, b'[', b']')?);
    }
    if bytes.get(pos) != Some(&b'{') {
        return None;
    }

    let end = matching_close(bytes, pos, b'{', b'}')?;
    Some((&text[pos + 1..end - 1], end))
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
        pos += 1;
    }
    pos
}

/// Given `bytes[open_at] == open`, returns the offset just past the matching `close`.
fn matching_close(bytes: &[u8], open_at: usize, open: u8, close: u8) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = open_at;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => {
                pos += 2;
                continue;
            }
            b if b == open => depth += 1,
            b if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos + 1);
                }
            }
            _ => {}
        }
        pos += 1;
    }
    None
}
