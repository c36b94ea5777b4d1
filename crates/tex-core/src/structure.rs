//! Outline construction from the include-expanded block stream.
//!
//! The outline is rebuilt on demand ([`Structure::update_items`]) and never patched. Building it
//! takes three passes over the root document's blocks:
//!
//! 1. **merge**: splice in the blocks of every included document at the include's position,
//!    or a synthetic `file` block when the include is not open. Only one level of inclusion is
//!    expanded; a child's own includes stay unexpanded.
//! 2. **dedup**: keep the first section-introducing block on each line of each source.
//! 3. **nest**: attach every section below the most recent open section of a shallower level,
//!    using a fixed table of one predecessor slot per level.

use std::collections::HashSet;
use std::path::Path;
use tex_core_lang::LEVEL_COUNT;
use tracing::debug;

use crate::blocks::{Block, BlockKind};
use crate::config::OutlineConfig;
use crate::workspace::{DocumentId, Include, IncludeResolver};

/// Where a merged block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockSource {
    /// The root document itself.
    Root,
    /// The include at this offset of the root document.
    Include(usize),
}

/// A block of the merged stream together with its owning document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedBlock {
    /// The block.
    pub block: Block,
    /// Document the block lives in; `None` for synthetic `file` blocks.
    pub document: Option<DocumentId>,
    /// Which splice produced the block.
    pub source: BlockSource,
}

/// Merge the root document's blocks with the blocks of the documents it includes.
///
/// An unknown root yields an empty stream.
pub fn merge_blocks(resolver: &dyn IncludeResolver, root: DocumentId) -> Vec<MergedBlock> {
    let Some(document) = resolver.document(root) else {
        return Vec::new();
    };
    let includes = document.get_includes(resolver);
    let mut includes = includes.into_iter().peekable();
    let mut merged = Vec::new();

    for block in document.get_blocks() {
        while let Some(include) = includes.next_if(|inc| inc.offset <= block.start_offset) {
            splice_include(resolver, include, &mut merged);
        }
        merged.push(MergedBlock {
            block: block.clone(),
            document: Some(root),
            source: BlockSource::Root,
        });
    }
    for include in includes {
        splice_include(resolver, include, &mut merged);
    }

    merged
}

fn splice_include(
    resolver: &dyn IncludeResolver,
    include: Include,
    merged: &mut Vec<MergedBlock>,
) {
    let source = BlockSource::Include(include.offset);
    match include
        .document
        .and_then(|id| resolver.document(id).map(|child| (id, child)))
    {
        Some((id, child)) => merged.extend(child.get_blocks().iter().map(|block| MergedBlock {
            block: block.clone(),
            document: Some(id),
            source,
        })),
        None => {
            let mut block = Block::file_placeholder(include.filename);
            block.start_offset = include.offset;
            block.end_offset = include.offset;
            merged.push(MergedBlock {
                block,
                document: None,
                source,
            });
        }
    }
}

/// Index of a node in a [`Forest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in [`Forest::nodes`].
    pub fn index(self) -> usize {
        self.0
    }
}

/// One outline row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    /// Document to navigate to; `None` for a file that is not open.
    pub document: Option<DocumentId>,
    /// Zero-based line of the section command.
    pub line_number: usize,
    /// Section kind.
    pub kind: BlockKind,
    /// Icon name, e.g. `"section-symbolic"`.
    pub icon_kind: String,
    /// Captured title with line breaks folded into spaces; the file name for `file` nodes.
    pub title: String,
    /// Child nodes in document order.
    pub children: Vec<NodeId>,
}

impl OutlineNode {
    /// Text to show: the base name for files, the title otherwise.
    pub fn display_title(&self) -> &str {
        if self.kind == BlockKind::File {
            Path::new(&self.title)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(&self.title)
        } else {
            &self.title
        }
    }
}

/// Arena-backed outline forest. Nodes are stored in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Forest {
    nodes: Vec<OutlineNode>,
    roots: Vec<NodeId>,
}

impl Forest {
    /// All nodes in document order.
    pub fn nodes(&self) -> &[OutlineNode] {
        &self.nodes
    }

    /// Top-level nodes.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Node by id.
    pub fn get(&self, id: NodeId) -> Option<&OutlineNode> {
        self.nodes.get(id.0)
    }

    /// Children of `id` (empty for unknown ids).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[], |node| &node.children)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the forest has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first pre-order walk yielding `(depth, id)`, the order rows are drawn in.
    pub fn walk(&self) -> Vec<(usize, NodeId)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, NodeId)> =
            self.roots.iter().rev().map(|id| (0, *id)).collect();
        while let Some((depth, id)) = stack.pop() {
            out.push((depth, id));
            stack.extend(self.children(id).iter().rev().map(|child| (depth + 1, *child)));
        }
        out
    }

    fn push(&mut self, node: OutlineNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }
}

/// Build the forest from a merged block stream.
///
/// Blocks that do not introduce a section are skipped, and only the first section per
/// `(source, line)` is kept.
pub fn build_forest(blocks: &[MergedBlock]) -> Forest {
    let mut forest = Forest::default();
    let mut seen: HashSet<(BlockSource, usize)> = HashSet::new();
    let mut predecessor: [Option<NodeId>; LEVEL_COUNT] = [None; LEVEL_COUNT];

    for merged in blocks {
        let Some(level) = merged.block.kind.level().map(usize::from) else {
            continue;
        };
        if !seen.insert((merged.source, merged.block.start_line)) {
            continue;
        }

        let node = OutlineNode {
            document: merged.document,
            line_number: merged.block.start_line,
            kind: merged.block.kind,
            icon_kind: merged.block.kind.icon_name(),
            title: merged
                .block
                .captured_text
                .lines()
                .collect::<Vec<_>>()
                .join(" "),
            children: Vec::new(),
        };
        let id = forest.push(node, predecessor[level]);
        for slot in predecessor.iter_mut().skip(level + 1) {
            *slot = Some(id);
        }
    }

    forest
}

/// The outline of one root document, sized for display.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    config: OutlineConfig,
    forest: Forest,
    height: u32,
}

impl Structure {
    /// Create an empty outline.
    pub fn new(config: OutlineConfig) -> Self {
        Self {
            config,
            forest: Forest::default(),
            height: 0,
        }
    }

    /// Rebuild from `root` and the documents it includes.
    pub fn update_items(&mut self, resolver: &dyn IncludeResolver, root: DocumentId) {
        let merged = merge_blocks(resolver, root);
        self.forest = build_forest(&merged);
        let rows = u32::try_from(self.forest.len()).unwrap_or(u32::MAX);
        self.height = if rows == 0 {
            0
        } else {
            rows.saturating_mul(self.config.row_height)
                .saturating_add(self.config.margin)
        };
        debug!(
            blocks = merged.len(),
            nodes = self.forest.len(),
            height = self.height,
            "outline rebuilt"
        );
    }

    /// The nested outline.
    pub fn get_forest(&self) -> &Forest {
        &self.forest
    }

    /// Nodes in line order, one per outline row.
    pub fn get_nodes_in_line(&self) -> &[OutlineNode] {
        self.forest.nodes()
    }

    /// Display height: `rows * row_height + margin`, or 0 for an empty outline.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` when there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    /// The row under vertical coordinate `y`, clamped to the existing rows.
    pub fn node_at_y(&self, y: f64) -> Option<&OutlineNode> {
        let last = self.forest.len().checked_sub(1)?;
        let row_height = f64::from(self.config.row_height.max(1));
        let row = ((y - f64::from(self.config.top_padding)) / row_height).floor();
        let index = if row <= 0.0 {
            0
        } else {
            (row as usize).min(last)
        };
        self.forest.nodes().get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn section(kind: BlockKind, line: usize, title: &str) -> MergedBlock {
        MergedBlock {
            block: Block {
                start_offset: line * 10,
                end_offset: line * 10 + 5,
                start_line: line,
                end_line: line,
                kind,
                captured_text: title.to_string(),
            },
            document: None,
            source: BlockSource::Root,
        }
    }

    fn shape(forest: &Forest) -> Vec<(usize, String)> {
        forest
            .walk()
            .into_iter()
            .filter_map(|(depth, id)| forest.get(id).map(|n| (depth, n.title.clone())))
            .collect()
    }

    #[test]
    fn nesting_by_level() {
        let forest = build_forest(&[
            section(BlockKind::Chapter, 0, "C"),
            section(BlockKind::Section, 1, "S1"),
            section(BlockKind::Subsection, 2, "SS"),
            section(BlockKind::Section, 3, "S2"),
        ]);
        assert_eq!(forest.roots().len(), 1);
        let chapter = forest.roots()[0];
        assert_eq!(forest.children(chapter).len(), 2);
        let first = forest.children(chapter)[0];
        let second = forest.children(chapter)[1];
        assert_eq!(forest.children(first).len(), 1);
        assert!(forest.children(second).is_empty());
    }

    #[test]
    fn skipped_levels_and_new_roots() {
        let forest = build_forest(&[
            section(BlockKind::Subsection, 0, "orphan"),
            section(BlockKind::Part, 1, "P"),
            section(BlockKind::Paragraph, 2, "para"),
            section(BlockKind::Chapter, 3, "C"),
            section(BlockKind::Part, 4, "P2"),
        ]);
        assert_eq!(
            shape(&forest),
            vec![
                (0, "orphan".to_string()),
                (0, "P".to_string()),
                (1, "para".to_string()),
                (1, "C".to_string()),
                (0, "P2".to_string()),
            ]
        );
    }

    #[test]
    fn first_block_per_line_wins() {
        let forest = build_forest(&[
            section(BlockKind::Section, 0, "kept"),
            section(BlockKind::Section, 0, "dropped"),
            section(BlockKind::Subsection, 1, "child"),
        ]);
        assert_eq!(
            shape(&forest),
            vec![(0, "kept".to_string()), (1, "child".to_string())]
        );
    }

    #[test]
    fn include_blocks_are_not_sections() {
        let forest = build_forest(&[section(BlockKind::Include, 0, "intro")]);
        assert!(forest.is_empty());
    }

    #[test]
    fn titles_fold_line_breaks() {
        let forest = build_forest(&[section(BlockKind::Section, 0, "A long\ntitle")]);
        assert_eq!(forest.nodes()[0].title, "A long title");
        assert_eq!(forest.nodes()[0].icon_kind, "section-symbolic");
    }

    #[test]
    fn file_nodes_show_base_name() {
        let mut block = section(BlockKind::File, 0, "chapters/one.tex");
        block.source = BlockSource::Include(3);
        let forest = build_forest(&[block]);
        assert_eq!(forest.nodes()[0].display_title(), "one.tex");
    }
}
