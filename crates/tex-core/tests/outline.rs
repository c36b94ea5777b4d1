use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tex_core::{
    BlockKind, BlockSource, DocumentId, Forest, OutlineConfig, Structure, Workspace, merge_blocks,
};

fn open(ws: &mut Workspace, path: &str, text: &str) -> DocumentId {
    ws.open(Some(PathBuf::from(path)), text).unwrap()
}

/// `(depth, kind, title)` rows in drawing order.
fn rows(forest: &Forest) -> Vec<(usize, BlockKind, String)> {
    forest
        .walk()
        .into_iter()
        .filter_map(|(depth, id)| {
            forest
                .get(id)
                .map(|node| (depth, node.kind, node.display_title().to_string()))
        })
        .collect()
}

#[test]
fn test_chapter_section_subsection_section() {
    let mut ws = Workspace::default();
    let root = open(
        &mut ws,
        "/doc/main.tex",
        "\\chapter{C}\n\\section{S1}\n\\subsection{SS}\n\\section{S2}\n",
    );
    let mut structure = Structure::new(OutlineConfig::default());
    structure.update_items(&ws, root);

    let forest = structure.get_forest();
    assert_eq!(forest.roots().len(), 1);
    let chapter = forest.roots()[0];
    let sections = forest.children(chapter);
    assert_eq!(sections.len(), 2);
    assert_eq!(forest.children(sections[0]).len(), 1);
    assert!(forest.children(sections[1]).is_empty());

    let lines: Vec<_> = structure
        .get_nodes_in_line()
        .iter()
        .map(|node| node.line_number)
        .collect();
    assert_eq!(lines, vec![0, 1, 2, 3]);
    assert_eq!(structure.height(), 4 * 24 + 33);
}

#[test]
fn test_empty_document_has_no_outline() {
    let mut ws = Workspace::default();
    let root = open(&mut ws, "/doc/main.tex", "");
    let mut structure = Structure::new(OutlineConfig::default());
    structure.update_items(&ws, root);
    assert!(structure.is_empty());
    assert_eq!(structure.height(), 0);
    assert!(structure.node_at_y(50.0).is_none());
}

#[test]
fn test_unknown_root_yields_empty_outline() {
    let mut ws = Workspace::default();
    let root = open(&mut ws, "/doc/main.tex", "\\section{A}");
    ws.close(root).unwrap();
    let mut structure = Structure::new(OutlineConfig::default());
    structure.update_items(&ws, root);
    assert!(structure.is_empty());
}

#[test]
fn test_unresolved_include_becomes_one_file_block() {
    let mut ws = Workspace::default();
    let root = open(
        &mut ws,
        "/doc/main.tex",
        "\\section{Before}\n\\input{chapters/missing}\n\\section{After}\n",
    );

    let merged = merge_blocks(&ws, root);
    let files: Vec<_> = merged
        .iter()
        .filter(|m| m.block.kind == BlockKind::File)
        .collect();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].block.captured_text, "chapters/missing");
    assert_eq!(files[0].document, None);
    assert_eq!(files[0].source, BlockSource::Include(17));

    let kinds: Vec<_> = merged.iter().map(|m| m.block.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::Section,
            BlockKind::File,
            BlockKind::Include,
            BlockKind::Section
        ]
    );

    let mut structure = Structure::new(OutlineConfig::default());
    structure.update_items(&ws, root);
    assert_eq!(
        rows(structure.get_forest()),
        vec![
            (0, BlockKind::Section, "Before".to_string()),
            (1, BlockKind::File, "missing".to_string()),
            (0, BlockKind::Section, "After".to_string()),
        ]
    );
}

#[test]
fn test_open_child_is_spliced_one_level_deep() {
    let mut ws = Workspace::default();
    let root = open(
        &mut ws,
        "/doc/main.tex",
        "\\chapter{One}\n\\include{ch/two}\n\\chapter{Three}\n",
    );
    let two = open(
        &mut ws,
        "/doc/ch/two.tex",
        "\\section{Two A}\n\\input{deeper}\n\\section{Two B}\n",
    );
    open(&mut ws, "/doc/ch/deeper.tex", "\\section{Never shown}\n");

    let mut structure = Structure::new(OutlineConfig::default());
    structure.update_items(&ws, root);
    assert_eq!(
        rows(structure.get_forest()),
        vec![
            (0, BlockKind::Chapter, "One".to_string()),
            (1, BlockKind::Section, "Two A".to_string()),
            (1, BlockKind::Section, "Two B".to_string()),
            (0, BlockKind::Chapter, "Three".to_string()),
        ]
    );

    let nodes = structure.get_nodes_in_line();
    assert_eq!(nodes[0].document, Some(root));
    assert_eq!(nodes[1].document, Some(two));
    assert_eq!(nodes[1].line_number, 0);
    assert_eq!(nodes[2].line_number, 2);
    assert_eq!(nodes[3].line_number, 2);
}

#[test]
fn test_closing_a_child_turns_it_into_a_file_node() {
    let mut ws = Workspace::default();
    let root = open(&mut ws, "/doc/main.tex", "\\input{intro}\n");
    let intro = open(&mut ws, "/doc/intro.tex", "\\section{Intro}\n");

    let mut structure = Structure::new(OutlineConfig::default());
    structure.update_items(&ws, root);
    assert_eq!(structure.get_nodes_in_line()[0].kind, BlockKind::Section);

    ws.close(intro).unwrap();
    structure.update_items(&ws, root);
    let nodes = structure.get_nodes_in_line();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].kind, BlockKind::File);
    assert_eq!(nodes[0].icon_kind, "file-symbolic");
    assert_eq!(nodes[0].title, "intro");
}

#[test]
fn test_same_line_sections_in_different_files_are_kept() {
    let mut ws = Workspace::default();
    let root = open(
        &mut ws,
        "/doc/main.tex",
        "\\section{Root}\\section{Same line}\n\\input{a}\\input{b}\n",
    );
    open(&mut ws, "/doc/a.tex", "\\subsection{From A}\n");

    let mut structure = Structure::new(OutlineConfig::default());
    structure.update_items(&ws, root);
    assert_eq!(
        rows(structure.get_forest()),
        vec![
            (0, BlockKind::Section, "Root".to_string()),
            (1, BlockKind::Subsection, "From A".to_string()),
            (2, BlockKind::File, "b".to_string()),
        ]
    );
}

#[test]
fn test_outline_follows_edits_on_next_update() {
    let mut ws = Workspace::default();
    let root = open(&mut ws, "/doc/main.tex", "\\section{A}\n");
    let mut structure = Structure::new(OutlineConfig::default());
    structure.update_items(&ws, root);
    assert_eq!(structure.get_nodes_in_line().len(), 1);

    let doc = ws.document_mut(root).unwrap();
    let end = doc.buffer().len_chars();
    doc.insert(end, "\\subsection{A.1}\n").unwrap();

    assert_eq!(structure.get_nodes_in_line().len(), 1);
    structure.update_items(&ws, root);
    assert_eq!(structure.get_nodes_in_line().len(), 2);
}

#[test]
fn test_node_at_y_clamps_to_rows() {
    let mut ws = Workspace::default();
    let root = open(
        &mut ws,
        "/doc/main.tex",
        "\\section{A}\n\\section{B}\n\\section{C}\n",
    );
    let mut structure = Structure::new(OutlineConfig::default());
    structure.update_items(&ws, root);

    let title_at = |y: f64| structure.node_at_y(y).map(|node| node.title.clone());
    assert_eq!(title_at(-10.0).as_deref(), Some("A"));
    assert_eq!(title_at(9.0 + 23.0).as_deref(), Some("A"));
    assert_eq!(title_at(9.0 + 24.0).as_deref(), Some("B"));
    assert_eq!(title_at(9.0 + 2.0 * 24.0).as_deref(), Some("C"));
    assert_eq!(title_at(10_000.0).as_deref(), Some("C"));
}
