//! Registry of open documents and include resolution.
//!
//! The [`Workspace`] owns every open [`Document`] and indexes them by a lexically normalized
//! path. It is also the default [`IncludeResolver`]: resolving an `\input{..}` name is a pure
//! lookup against already-open documents and never touches the filesystem.

use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};
use tex_core_lang::Language;
use tracing::debug;

use crate::config::EditingConfig;
use crate::document::Document;
use crate::error::DocumentError;
use crate::symbols::SymbolIndexer;

/// Opaque identifier for an open document in a [`Workspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A reference from one document to another through a file-inclusion command.
///
/// The include never owns the referenced document; `document` is only an id into the registry
/// and is `None` until that file is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    /// Character offset of the inclusion command in the including document.
    pub offset: usize,
    /// File name as written in the source.
    pub filename: String,
    /// The open document the name resolves to.
    pub document: Option<DocumentId>,
}

/// Maps inclusion names to open documents.
///
/// Implementations must not perform I/O; opening files is triggered from outside.
pub trait IncludeResolver {
    /// Resolve `filename` as written in a document located at `from`.
    fn resolve(&self, from: Option<&Path>, filename: &str) -> Option<DocumentId>;

    /// An open document by id.
    fn document(&self, id: DocumentId) -> Option<&Document>;
}

/// Builds the symbol indexer for a newly opened document.
pub type IndexerFactory = Box<dyn Fn(Language) -> SymbolIndexer + Send>;

/// Open documents keyed by id, plus a normalized path index.
pub struct Workspace {
    next_document_id: u64,
    documents: BTreeMap<DocumentId, Document>,
    path_to_document: HashMap<PathBuf, DocumentId>,
    config: EditingConfig,
    indexer_factory: IndexerFactory,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("document_count", &self.documents.len())
            .field("path_count", &self.path_to_document.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(EditingConfig::default())
    }
}

impl Workspace {
    /// Create an empty workspace. LaTeX documents get the built-in label and `\bibitem`
    /// scanners; BibTeX documents get none until [`Workspace::set_indexer_factory`] is used.
    pub fn new(config: EditingConfig) -> Self {
        Self {
            next_document_id: 1,
            documents: BTreeMap::new(),
            path_to_document: HashMap::new(),
            config,
            indexer_factory: Box::new(default_indexer),
        }
    }

    /// Replace the factory that builds symbol indexers for newly opened documents.
    pub fn set_indexer_factory<F>(&mut self, factory: F)
    where
        F: Fn(Language) -> SymbolIndexer + Send + 'static,
    {
        self.indexer_factory = Box::new(factory);
    }

    /// Number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if no documents are open.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Open a document. The language is derived from the path's extension.
    pub fn open(&mut self, path: Option<PathBuf>, text: &str) -> Result<DocumentId, DocumentError> {
        let path = path.map(|p| normalize_path(&p));
        if let Some(path) = &path
            && self.path_to_document.contains_key(path)
        {
            return Err(DocumentError::AlreadyOpen(path.clone()));
        }

        let language = path
            .as_deref()
            .map(Language::from_path)
            .unwrap_or_default();
        let indexer = (self.indexer_factory)(language);
        let mut document = Document::with_indexer(language, self.config.clone(), indexer, text);
        document.set_path(path.clone());

        let id = DocumentId(self.next_document_id);
        self.next_document_id = self.next_document_id.saturating_add(1);
        if let Some(path) = path {
            debug!(path = %path.display(), id = id.get(), "document opened");
            self.path_to_document.insert(path, id);
        }
        self.documents.insert(id, document);
        Ok(id)
    }

    /// Close a document and hand it back.
    pub fn close(&mut self, id: DocumentId) -> Result<Document, DocumentError> {
        let document = self
            .documents
            .remove(&id)
            .ok_or(DocumentError::UnknownDocument(id))?;
        if let Some(path) = document.path() {
            self.path_to_document.remove(path);
        }
        Ok(document)
    }

    /// An open document.
    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// An open document, mutably.
    pub fn document_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(&id)
    }

    /// Ids of all open documents, in opening order.
    pub fn document_ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.documents.keys().copied()
    }

    /// Id of the document open at `path` (compared after lexical normalization).
    pub fn id_for_path(&self, path: &Path) -> Option<DocumentId> {
        self.path_to_document.get(&normalize_path(path)).copied()
    }

    /// Inclusion markers of document `id`, resolved against this workspace.
    pub fn get_includes(&self, id: DocumentId) -> Result<Vec<Include>, DocumentError> {
        let document = self
            .documents
            .get(&id)
            .ok_or(DocumentError::UnknownDocument(id))?;
        Ok(document.get_includes(self))
    }
}

impl IncludeResolver for Workspace {
    fn resolve(&self, from: Option<&Path>, filename: &str) -> Option<DocumentId> {
        if filename.is_empty() {
            return None;
        }
        let path = include_path(from, filename);
        self.path_to_document.get(&path).copied()
    }

    fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }
}

fn default_indexer(language: Language) -> SymbolIndexer {
    match language {
        Language::Latex => SymbolIndexer::latex(),
        Language::Bibtex => SymbolIndexer::new(Vec::new()),
    }
}

/// The path an inclusion name refers to: relative to the including document's directory, with
/// `.tex` appended when the name has no extension.
pub fn include_path(from: Option<&Path>, filename: &str) -> PathBuf {
    let mut name = PathBuf::from(filename);
    if name.extension().is_none() {
        name.set_extension("tex");
    }
    let joined = match from.and_then(Path::parent) {
        Some(dir) if name.is_relative() => dir.join(name),
        _ => name,
    };
    normalize_path(&joined)
}

/// Fold `.` and `..` components without consulting the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_lexical() {
        assert_eq!(
            normalize_path(Path::new("/a/./b/../c.tex")),
            PathBuf::from("/a/c.tex")
        );
        assert_eq!(normalize_path(Path::new("../x/./y")), PathBuf::from("../x/y"));
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn include_paths() {
        let root = Path::new("/book/main.tex");
        assert_eq!(
            include_path(Some(root), "chapters/intro"),
            PathBuf::from("/book/chapters/intro.tex")
        );
        assert_eq!(
            include_path(Some(root), "../shared/defs.sty"),
            PathBuf::from("/shared/defs.sty")
        );
        assert_eq!(include_path(None, "a"), PathBuf::from("a.tex"));
        assert_eq!(
            include_path(Some(root), "/abs/x.tex"),
            PathBuf::from("/abs/x.tex")
        );
    }

    #[test]
    fn open_close_and_lookup() {
        let mut ws = Workspace::default();
        let id = ws.open(Some(PathBuf::from("/p/./main.tex")), "x").unwrap();
        assert_eq!(ws.id_for_path(Path::new("/p/main.tex")), Some(id));
        assert_eq!(
            ws.open(Some(PathBuf::from("/p/main.tex")), "y").unwrap_err(),
            DocumentError::AlreadyOpen(PathBuf::from("/p/main.tex"))
        );

        let unnamed = ws.open(None, "z").unwrap();
        assert_ne!(unnamed, id);
        assert_eq!(ws.len(), 2);

        let closed = ws.close(id).unwrap();
        assert_eq!(closed.text(), "x");
        assert_eq!(ws.id_for_path(Path::new("/p/main.tex")), None);
        assert_eq!(ws.close(id).unwrap_err(), DocumentError::UnknownDocument(id));
    }

    #[test]
    fn language_follows_extension() {
        let mut ws = Workspace::default();
        let bib = ws.open(Some(PathBuf::from("/p/refs.bib")), "").unwrap();
        assert_eq!(ws.document(bib).map(Document::language), Some(Language::Bibtex));
    }

    #[test]
    fn includes_resolve_only_open_documents() {
        let mut ws = Workspace::default();
        let main = ws
            .open(
                Some(PathBuf::from("/p/main.tex")),
                "\\input{intro}\n\\include{missing}\n",
            )
            .unwrap();
        let intro = ws.open(Some(PathBuf::from("/p/intro.tex")), "").unwrap();

        let includes = ws.get_includes(main).unwrap();
        assert_eq!(
            includes,
            vec![
                Include {
                    offset: 0,
                    filename: "intro".to_string(),
                    document: Some(intro),
                },
                Include {
                    offset: 14,
                    filename: "missing".to_string(),
                    document: None,
                },
            ]
        );
    }
}
