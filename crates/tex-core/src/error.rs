//! Error types.
//!
//! Only mutations and configuration loading can fail. Queries (symbols, blocks, outline,
//! locate) degrade to empty results instead of returning errors.

use std::path::PathBuf;
use thiserror::Error;

use crate::workspace::DocumentId;

/// Errors produced when mutating a document or the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("offset {offset} is outside the document (length {len})")]
    /// An offset was past the end of the buffer.
    OffsetOutOfRange {
        /// Requested character offset.
        offset: usize,
        /// Current buffer length in characters.
        len: usize,
    },

    #[error("range {start}..{end} is outside the document (length {len})")]
    /// A range ended past the end of the buffer.
    RangeOutOfRange {
        /// Range start (characters).
        start: usize,
        /// Range end (characters, exclusive).
        end: usize,
        /// Current buffer length in characters.
        len: usize,
    },

    #[error("line {line} is outside the document ({line_count} lines)")]
    /// A line number was past the last line.
    LineOutOfRange {
        /// Requested zero-based line.
        line: usize,
        /// Current line count.
        line_count: usize,
    },

    #[error("document {0:?} is not open")]
    /// A document id was not found in the workspace.
    UnknownDocument(DocumentId),

    #[error("a document for {} is already open", .0.display())]
    /// A document with the same normalized path is already registered.
    AlreadyOpen(PathBuf),
}

/// Rejected forward-search input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("target word is empty")]
    /// The target word was empty, so there is nothing to search for.
    EmptyWord,
}

/// A symbol scanner rejected the document text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ScanError {
    /// Human readable failure description.
    pub message: String,
    /// Character offset the failure was detected at, if known.
    pub offset: Option<usize>,
}

impl ScanError {
    /// Create a scan error with an optional location.
    pub fn new(message: impl Into<String>, offset: Option<usize>) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    /// JSON decoding failed.
    Json(#[from] serde_json::Error),
}
