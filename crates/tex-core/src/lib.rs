#![warn(missing_docs)]
//! TeX Core - Headless LaTeX Document Model
//!
//! # Overview
//!
//! `tex-core` keeps a LaTeX source buffer synchronized, on every edit, with the lexical indexes
//! an editor needs around it: the symbol table (labels, citation keys), the ordered list of
//! sectioning and inclusion markers, and per-line indentation guides. On top of those it builds
//! the document outline across included files and maps forward-search locators from a PDF
//! viewer back onto buffer ranges.
//!
//! It does no rendering and no file I/O; the host feeds it text and edits.
//!
//! # Data Flow
//!
//! ```text
//! edit ──► TextBuffer ──► Edit ──┬──► SymbolIndexer   (full rescan)
//!                                ├──► BlockExtractor  (full rescan)
//!                                └──► IndentGuides    (incremental)
//!
//! Structure::update_items (pull) ──► root blocks + IncludeResolver ──► merge ──► Forest
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::path::PathBuf;
//! use tex_core::{OutlineConfig, Structure, SymbolKind, Workspace};
//!
//! let mut workspace = Workspace::default();
//! let main = workspace
//!     .open(
//!         Some(PathBuf::from("/thesis/main.tex")),
//!         "\\chapter{Intro}\\label{ch:intro}\n\\input{methods}\n",
//!     )
//!     .unwrap();
//! workspace
//!     .open(Some(PathBuf::from("/thesis/methods.tex")), "\\section{Setup}\n")
//!     .unwrap();
//!
//! let doc = workspace.document(main).unwrap();
//! assert!(doc.get_symbols(SymbolKind::Label).contains("ch:intro"));
//!
//! let mut outline = Structure::new(OutlineConfig::default());
//! outline.update_items(&workspace, main);
//! let titles: Vec<_> = outline
//!     .get_nodes_in_line()
//!     .iter()
//!     .map(|node| node.title.as_str())
//!     .collect();
//! assert_eq!(titles, ["Intro", "Setup"]);
//! assert_eq!(outline.height(), 2 * 24 + 33);
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] - Rope-backed text buffer with marks and edit notifications
//! - [`edit`] - Edit events
//! - [`document`] - One document with its derived indexes, snippet and comment editing
//! - [`symbols`] - Symbol table and pluggable scanners
//! - [`blocks`] - Sectioning and inclusion markers
//! - [`indent`] - Incremental indentation guides
//! - [`workspace`] - Open documents and include resolution
//! - [`structure`] - Outline forest
//! - [`locate`] - Fuzzy forward-search locator
//! - [`highlights`] - Fading forward-search highlights
//! - [`placeholders`] - Placeholder selection
//! - [`packages`] - `\usepackage` inspection and editing
//! - [`completion`] - Completion context
//! - [`config`] - Host-provided settings
//! - [`error`] - Error types

pub mod blocks;
pub mod buffer;
mod comments;
pub mod completion;
pub mod config;
pub mod document;
pub mod edit;
pub mod error;
pub mod highlights;
pub mod indent;
pub mod locate;
pub mod packages;
pub mod placeholders;
mod snippets;
pub mod structure;
pub mod symbols;
mod text;
pub mod workspace;

pub use blocks::{Block, BlockExtractor, BlockKind};
pub use buffer::{EditCallback, Gravity, Mark, TextBuffer};
pub use completion::begin_end_word_at;
pub use config::{CoreConfig, EditingConfig, HighlightConfig, OutlineConfig};
pub use document::Document;
pub use edit::{Edit, EditKind};
pub use error::{ConfigError, DocumentError, LocateError, ScanError};
pub use highlights::{Highlight, HighlightFader};
pub use indent::IndentGuides;
pub use locate::{forward_search, locate, try_locate};
pub use packages::PackageDeclaration;
pub use placeholders::{PLACEHOLDER, PlaceholderTracker};
pub use structure::{
    BlockSource, Forest, MergedBlock, NodeId, OutlineNode, Structure, build_forest, merge_blocks,
};
pub use symbols::{RegexScanner, Symbol, SymbolIndexer, SymbolKind, SymbolScanner, SymbolTable};
pub use workspace::{DocumentId, Include, IncludeResolver, IndexerFactory, Workspace};
