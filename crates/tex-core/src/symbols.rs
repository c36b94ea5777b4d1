//! Symbol index: labels and citation keys used for cross-references and completion.
//!
//! The index is rebuilt, never diffed: every edit rescans the whole current text with one
//! precompiled pattern (or parser) per symbol kind and replaces that kind's set. Consumers must
//! re-read the table after each edit notification.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::edit::Edit;
use crate::error::ScanError;

/// The kinds of symbols tracked per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
    /// `\label{...}` names.
    Label,
    /// Citation keys (`\bibitem{...}` in LaTeX sources, entry keys in BibTeX databases).
    Citation,
}

/// A single extracted symbol.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    /// Symbol kind.
    pub kind: SymbolKind,
    /// Symbol name.
    pub name: String,
}

static EMPTY: BTreeSet<String> = BTreeSet::new();

/// `kind -> set of names`. Duplicates collapse; order is irrelevant (sets iterate sorted).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolTable {
    sets: BTreeMap<SymbolKind, BTreeSet<String>>,
}

impl SymbolTable {
    /// Names of the given kind (empty if none were found).
    pub fn get(&self, kind: SymbolKind) -> &BTreeSet<String> {
        self.sets.get(&kind).unwrap_or(&EMPTY)
    }

    /// Returns `true` if `name` is known under `kind`.
    pub fn contains(&self, kind: SymbolKind, name: &str) -> bool {
        self.get(kind).contains(name)
    }

    /// Total number of names across all kinds.
    pub fn len(&self) -> usize {
        self.sets.values().map(BTreeSet::len).sum()
    }

    /// Returns `true` if no symbols are known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All symbols, ordered by kind and then name.
    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.sets.iter().flat_map(|(kind, names)| {
            names.iter().map(|name| Symbol {
                kind: *kind,
                name: name.clone(),
            })
        })
    }

    /// Names of `kind` starting with `prefix`, sorted.
    pub fn with_prefix<'a>(&'a self, kind: SymbolKind, prefix: &'a str) -> Vec<&'a str> {
        self.get(kind)
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|name| name.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }

    fn replace(&mut self, kind: SymbolKind, names: BTreeSet<String>) {
        if names.is_empty() {
            self.sets.remove(&kind);
        } else {
            self.sets.insert(kind, names);
        }
    }
}

/// Extracts the full set of names of one kind from a document's text.
///
/// Scanners are injected into the indexer at construction, so hosts can plug in
/// format-specific extractors (e.g. a BibTeX parser) next to the built-in regex scanners.
pub trait SymbolScanner: Send {
    /// The kind of symbol this scanner produces.
    fn kind(&self) -> SymbolKind;

    /// Scan the complete text.
    ///
    /// A text without matches yields an empty set; an error means the scanner refused the text
    /// as malformed.
    fn scan(&self, text: &str) -> Result<BTreeSet<String>, ScanError>;
}

/// A scanner that collects capture group 1 of every match of a regex.
#[derive(Debug, Clone)]
pub struct RegexScanner {
    kind: SymbolKind,
    regex: Regex,
}

impl RegexScanner {
    /// Create a scanner from a pattern whose first capture group is the symbol name.
    pub fn new(kind: SymbolKind, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            kind,
            regex: Regex::new(pattern)?,
        })
    }

    /// `\label{name}`.
    pub fn latex_labels() -> Self {
        Self {
            kind: SymbolKind::Label,
            regex: LABEL.clone(),
        }
    }

    /// `\bibitem[optional]{key}`.
    pub fn latex_bibitems() -> Self {
        Self {
            kind: SymbolKind::Citation,
            regex: BIBITEM.clone(),
        }
    }
}

static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\label\s*\{([^{}]+)\}").expect("valid label regex")
});
static BIBITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\bibitem\s*(?:\[[^\]]*\])?\s*\{([^{}]+)\}").expect("valid bibitem regex")
});

impl SymbolScanner for RegexScanner {
    fn kind(&self) -> SymbolKind {
        self.kind
    }

    fn scan(&self, text: &str) -> Result<BTreeSet<String>, ScanError> {
        Ok(self
            .regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Maintains a [`SymbolTable`] for one document by full rescans.
pub struct SymbolIndexer {
    scanners: Vec<Box<dyn SymbolScanner>>,
    table: SymbolTable,
}

impl std::fmt::Debug for SymbolIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolIndexer")
            .field("scanner_count", &self.scanners.len())
            .field("table", &self.table)
            .finish()
    }
}

impl SymbolIndexer {
    /// Create an indexer from explicit scanners.
    pub fn new(scanners: Vec<Box<dyn SymbolScanner>>) -> Self {
        Self {
            scanners,
            table: SymbolTable::default(),
        }
    }

    /// Labels and `\bibitem` keys, the default for LaTeX sources.
    pub fn latex() -> Self {
        Self::new(vec![
            Box::new(RegexScanner::latex_labels()),
            Box::new(RegexScanner::latex_bibitems()),
        ])
    }

    /// Current table.
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// React to an edit; `text` is the complete text after the edit.
    pub fn on_edit(&mut self, _edit: &Edit, text: &str) {
        self.rescan(text);
    }

    /// Rebuild every kind from `text`.
    ///
    /// A scanner that rejects the text empties its whole kind; other kinds are unaffected.
    pub fn rescan(&mut self, text: &str) {
        let mut fresh: BTreeMap<SymbolKind, BTreeSet<String>> = BTreeMap::new();
        let mut failed: BTreeSet<SymbolKind> = BTreeSet::new();
        for scanner in &self.scanners {
            match scanner.scan(text) {
                Ok(found) => fresh.entry(scanner.kind()).or_default().extend(found),
                Err(err) => {
                    warn!(
                        kind = ?scanner.kind(),
                        offset = ?err.offset,
                        "symbol scan failed, keeping an empty set: {err}"
                    );
                    failed.insert(scanner.kind());
                }
            }
        }

        let mut table = SymbolTable::default();
        for (kind, names) in fresh {
            if !failed.contains(&kind) {
                table.replace(kind, names);
            }
        }
        debug!(symbols = table.len(), "symbol index rebuilt");
        self.table = table;
    }
}
