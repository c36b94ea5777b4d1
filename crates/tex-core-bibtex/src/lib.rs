#![warn(missing_docs)]
//! `tex-core-bibtex` - citation keys from BibTeX databases for `tex-core`.
//!
//! Provides a [`SymbolScanner`] for `.bib` documents with two modes:
//!
//! - [`ScanMode::Permissive`]: a regex over `@type{key` headers. Never fails, tolerates
//!   half-typed entries.
//! - [`ScanMode::Strict`]: a full parse ([`parser::parse`]). A malformed database is reported as
//!   a [`ScanError`]; the symbol indexer then keeps an empty citation set for the document.
//!
//! # Example
//!
//! ```rust
//! use std::path::PathBuf;
//! use tex_core::{SymbolKind, Workspace};
//! use tex_core_bibtex::{ScanMode, indexer_for};
//!
//! let mut workspace = Workspace::default();
//! workspace.set_indexer_factory(|language| indexer_for(language, ScanMode::Strict));
//!
//! let refs = workspace
//!     .open(
//!         Some(PathBuf::from("/thesis/refs.bib")),
//!         "@book{knuth84, title = {The {\\TeX}book}}",
//!     )
//!     .unwrap();
//! let citations = workspace.document(refs).unwrap().get_symbols(SymbolKind::Citation);
//! assert!(citations.contains("knuth84"));
//! ```

pub mod lexer;
pub mod parser;
pub mod permissive;

use std::collections::BTreeSet;
use tex_core::{ScanError, SymbolIndexer, SymbolKind, SymbolScanner};
use tex_core_lang::Language;
use tracing::trace;

pub use parser::{BibParseError, Bibliography, Entry, Field, parse};

/// How citation keys are extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Regex over entry headers.
    #[default]
    Permissive,
    /// Full parse; malformed input is an error.
    Strict,
}

/// Extracts [`SymbolKind::Citation`] keys from BibTeX text.
#[derive(Debug, Clone, Copy, Default)]
pub struct CitationScanner {
    mode: ScanMode,
}

impl CitationScanner {
    /// Create a scanner using `mode`.
    pub fn new(mode: ScanMode) -> Self {
        Self { mode }
    }

    /// The extraction mode.
    pub fn mode(&self) -> ScanMode {
        self.mode
    }
}

impl SymbolScanner for CitationScanner {
    fn kind(&self) -> SymbolKind {
        SymbolKind::Citation
    }

    fn scan(&self, text: &str) -> Result<BTreeSet<String>, ScanError> {
        match self.mode {
            ScanMode::Permissive => Ok(permissive::citation_keys(text)),
            ScanMode::Strict => {
                let bibliography = parse(text)
                    .map_err(|err| ScanError::new(err.to_string(), Some(err.offset())))?;
                trace!(entries = bibliography.entries.len(), "bibliography parsed");
                Ok(bibliography.keys().map(str::to_string).collect())
            }
        }
    }
}

/// Symbol indexer for a newly opened document: the built-in LaTeX scanners for sources, a
/// [`CitationScanner`] in `mode` for BibTeX databases.
///
/// Meant for [`tex_core::Workspace::set_indexer_factory`].
pub fn indexer_for(language: Language, mode: ScanMode) -> SymbolIndexer {
    match language {
        Language::Latex => SymbolIndexer::latex(),
        Language::Bibtex => SymbolIndexer::new(vec![Box::new(CitationScanner::new(mode))]),
    }
}
