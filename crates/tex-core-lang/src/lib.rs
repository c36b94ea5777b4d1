#![warn(missing_docs)]
//! `tex-core-lang` - data-driven language configuration helpers for `tex-core`.
//!
//! This crate intentionally stays lightweight and has no dependencies. It describes the two
//! document languages the core understands (LaTeX sources and BibTeX databases), their comment
//! tokens, and the LaTeX sectioning hierarchy used to nest outline entries.

use std::path::Path;

/// Comment tokens for a given language.
///
/// The core uses this to implement comment toggling in a UI-agnostic way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `%`).
    pub line: Option<String>,
}

impl CommentConfig {
    /// Create a config that supports line comments with `token`.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
        }
    }

    /// Returns `true` if a non-empty line comment token is configured.
    pub fn has_line(&self) -> bool {
        self.line.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// The language a document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    /// LaTeX source (`.tex`, `.sty`, `.cls`, ...).
    #[default]
    Latex,
    /// BibTeX database (`.bib`).
    Bibtex,
}

impl Language {
    /// Guess the language from a file path. Anything that is not `.bib` is treated as LaTeX.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("bib") => Self::Bibtex,
            _ => Self::Latex,
        }
    }

    /// Comment configuration for this language.
    ///
    /// Both LaTeX and BibTeX use `%` line comments.
    pub fn comment_config(self) -> CommentConfig {
        CommentConfig::line("%")
    }

    /// Whether documents in this language contain sectioning/inclusion markup.
    pub fn has_structure(self) -> bool {
        matches!(self, Self::Latex)
    }
}

/// Sectioning commands in outline order, root-most first.
///
/// The index of a name in this table is its nesting level.
pub const SECTIONING_COMMANDS: [&str; 7] = [
    "part",
    "chapter",
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

/// Nesting level of synthetic placeholder entries for included files that are not open.
///
/// Placeholders sit below every sectioning command and never get children of their own.
pub const FILE_LEVEL: u8 = 7;

/// Number of distinct nesting levels (sectioning commands plus the file placeholder level).
pub const LEVEL_COUNT: usize = 8;

/// Returns the nesting level of a sectioning command name (without the leading backslash).
pub fn sectioning_level(command: &str) -> Option<u8> {
    SECTIONING_COMMANDS
        .iter()
        .position(|name| *name == command)
        .map(|idx| idx as u8)
}

/// Commands whose single braced argument names another source file to splice in.
pub const INCLUSION_COMMANDS: [&str; 2] = ["include", "input"];

/// Returns `true` if `command` is a file-inclusion command.
pub fn is_inclusion_command(command: &str) -> bool {
    INCLUSION_COMMANDS.contains(&command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_follow_table_order() {
        assert_eq!(sectioning_level("part"), Some(0));
        assert_eq!(sectioning_level("section"), Some(2));
        assert_eq!(sectioning_level("subparagraph"), Some(6));
        assert_eq!(sectioning_level("sectionmark"), None);
        assert!(usize::from(FILE_LEVEL) < LEVEL_COUNT);
    }

    #[test]
    fn language_from_extension() {
        assert_eq!(Language::from_path(Path::new("refs.bib")), Language::Bibtex);
        assert_eq!(Language::from_path(Path::new("refs.BIB")), Language::Bibtex);
        assert_eq!(Language::from_path(Path::new("main.tex")), Language::Latex);
        assert_eq!(Language::from_path(Path::new("Makefile")), Language::Latex);
        assert!(Language::Latex.has_structure());
        assert!(!Language::Bibtex.has_structure());
    }

    #[test]
    fn comment_token() {
        let config = Language::Bibtex.comment_config();
        assert!(config.has_line());
        assert_eq!(config.line.as_deref(), Some("%"));
        assert!(!CommentConfig::default().has_line());
    }
}
