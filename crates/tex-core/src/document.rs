//! A single open document: buffer plus every derived index.
//!
//! Each mutation goes through [`Document`], which forwards it to the [`TextBuffer`] and then
//! re-derives the symbol table, the block list and the indentation guides on the same call stack
//! before returning. Readers therefore never observe a stale index.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tex_core_lang::Language;
use tracing::trace;

use crate::blocks::{Block, BlockExtractor, BlockKind};
use crate::buffer::{Gravity, TextBuffer};
use crate::config::EditingConfig;
use crate::edit::Edit;
use crate::error::DocumentError;
use crate::indent::IndentGuides;
use crate::symbols::{SymbolIndexer, SymbolKind, SymbolTable};
use crate::workspace::{Include, IncludeResolver};

/// Buffer, symbol index, block list and indentation guides of one document.
pub struct Document {
    path: Option<PathBuf>,
    language: Language,
    config: EditingConfig,
    buffer: TextBuffer,
    symbols: SymbolIndexer,
    blocks: BlockExtractor,
    indent: IndentGuides,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("language", &self.language)
            .field("buffer", &self.buffer)
            .field("symbols", &self.symbols.table().len())
            .field("blocks", &self.blocks.blocks().len())
            .finish()
    }
}

impl Document {
    /// A LaTeX document with default settings.
    pub fn new(text: &str) -> Self {
        Self::with_indexer(
            Language::Latex,
            EditingConfig::default(),
            SymbolIndexer::latex(),
            text,
        )
    }

    /// A document with an explicit language, settings and symbol indexer.
    pub fn with_indexer(
        language: Language,
        config: EditingConfig,
        symbols: SymbolIndexer,
        text: &str,
    ) -> Self {
        let buffer = TextBuffer::new(text);
        let indent = IndentGuides::new(&buffer, config.tab_width);
        let mut document = Self {
            path: None,
            language,
            config,
            buffer,
            symbols,
            blocks: BlockExtractor::new(),
            indent,
        };
        document.rescan();
        document
    }

    /// File path, if the document has one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn set_path(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }

    /// Document language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Editing settings.
    pub fn config(&self) -> &EditingConfig {
        &self.config
    }

    /// Read access to the underlying buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Complete text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Full symbol table.
    pub fn symbol_table(&self) -> &SymbolTable {
        self.symbols.table()
    }

    /// Names of one symbol kind.
    pub fn get_symbols(&self, kind: SymbolKind) -> &BTreeSet<String> {
        self.symbols.table().get(kind)
    }

    /// Blocks in document order.
    pub fn get_blocks(&self) -> &[Block] {
        self.blocks.blocks()
    }

    /// Inclusion markers in offset order, each resolved against `resolver`.
    ///
    /// Unresolved names keep `document: None`; resolution never loads anything.
    pub fn get_includes(&self, resolver: &dyn IncludeResolver) -> Vec<Include> {
        self.blocks
            .blocks()
            .iter()
            .filter(|block| block.kind == BlockKind::Include)
            .map(|block| {
                let filename = block.captured_text.trim().to_string();
                let document = resolver.resolve(self.path(), &filename);
                trace!(filename = %filename, resolved = ?document, "include resolved");
                Include {
                    offset: block.start_offset,
                    filename,
                    document,
                }
            })
            .collect()
    }

    /// `(line, width)` for every indented line.
    pub fn indent_guides(&self) -> Vec<(usize, usize)> {
        self.indent.guides()
    }

    /// Subscribe to edit notifications of the underlying buffer.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&Edit) + Send + 'static,
    {
        self.buffer.subscribe(callback);
    }

    /// Create or move a named mark.
    pub fn set_mark(
        &mut self,
        name: impl Into<String>,
        offset: usize,
        gravity: Gravity,
    ) -> Result<(), DocumentError> {
        self.buffer.set_mark(name, offset, gravity)
    }

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<Option<Edit>, DocumentError> {
        let edit = self.buffer.insert(offset, text)?;
        if let Some(edit) = &edit {
            self.after_edit(edit);
        }
        Ok(edit)
    }

    /// Delete `len` characters at `offset`.
    pub fn delete(&mut self, offset: usize, len: usize) -> Result<Option<Edit>, DocumentError> {
        let edit = self.buffer.delete(offset, len)?;
        if let Some(edit) = &edit {
            self.after_edit(edit);
        }
        Ok(edit)
    }

    /// Replace `len` characters at `offset` with `text`.
    pub fn replace(
        &mut self,
        offset: usize,
        len: usize,
        text: &str,
    ) -> Result<Vec<Edit>, DocumentError> {
        let mut edits = Vec::with_capacity(2);
        edits.extend(self.delete(offset, len)?);
        edits.extend(self.insert(offset, text)?);
        Ok(edits)
    }

    /// Sorted symbol names of `kind` that start with `prefix`.
    pub fn complete_symbols(&self, kind: SymbolKind, prefix: &str) -> Vec<String> {
        self.symbols
            .table()
            .with_prefix(kind, prefix)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn after_edit(&mut self, edit: &Edit) {
        let text = self.buffer.text();
        self.symbols.on_edit(edit, &text);
        if self.language.has_structure() {
            self.blocks.on_edit(edit, &text);
        }
        self.indent.on_edit(edit, &self.buffer);
    }

    fn rescan(&mut self) {
        let text = self.buffer.text();
        self.symbols.rescan(&text);
        if self.language.has_structure() {
            self.blocks.rescan(&text);
        }
    }
}
