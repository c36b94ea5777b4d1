//! `\usepackage` inspection and editing.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::document::Document;
use crate::error::DocumentError;
use crate::text::CharIndex;

static USEPACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\usepackage\s*(?:\[[^\]]*\])?\s*\{\s*([\w-]+)\s*\}")
        .expect("valid usepackage regex")
});

/// One `\usepackage` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDeclaration {
    /// Character offset of the declaration.
    pub offset: usize,
    /// Exact declaration text, options included.
    pub text: String,
}

impl PackageDeclaration {
    /// Character offset just past the declaration.
    pub fn end(&self) -> usize {
        self.offset + self.text.chars().count()
    }
}

impl Document {
    /// Every single-package `\usepackage[..]{name}` declaration, keyed by package name.
    ///
    /// When a package is declared twice the later declaration wins.
    pub fn package_details(&self) -> BTreeMap<String, PackageDeclaration> {
        let text = self.text();
        let index = CharIndex::new(&text);

        USEPACKAGE
            .captures_iter(&text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(1)?;
                Some((
                    name.as_str().to_string(),
                    PackageDeclaration {
                        offset: index.byte_to_char(whole.start()),
                        text: whole.as_str().to_string(),
                    },
                ))
            })
            .collect()
    }

    /// Add one `\usepackage{name}` line per name.
    ///
    /// The lines go after the last existing declaration, else after the `\documentclass` line,
    /// else at `fallback`.
    pub fn add_packages(&mut self, names: &[&str], fallback: usize) -> Result<(), DocumentError> {
        if names.is_empty() {
            return Ok(());
        }
        let lines = names
            .iter()
            .map(|name| format!("\\usepackage{{{name}}}"))
            .collect::<Vec<_>>()
            .join("\n");

        let anchor = match self.package_details().values().map(PackageDeclaration::end).max() {
            Some(end) => Some(end),
            None => {
                let text = self.text();
                text.rfind("\\documentclass")
                    .map(|byte| text[..byte].chars().count())
            }
        };

        match anchor {
            Some(offset) => {
                let buffer = self.buffer();
                let at = buffer.line_end(buffer.line_of_offset(offset));
                self.insert_snippet(at..at, &format!("\n{lines}"), true)?;
            }
            None => {
                self.insert_snippet(fallback..fallback, &lines, true)?;
            }
        }
        debug!(count = names.len(), "packages added");
        Ok(())
    }

    /// Remove the declarations of `names`, each together with the line break before it.
    ///
    /// Processing stops at the first name that is not declared. Returns how many declarations
    /// were removed.
    pub fn remove_packages(&mut self, names: &[&str]) -> Result<usize, DocumentError> {
        let details = self.package_details();
        let mut targets: Vec<&PackageDeclaration> = Vec::new();
        for name in names {
            match details.get(*name) {
                Some(declaration) => targets.push(declaration),
                None => break,
            }
        }
        // Back to front so earlier offsets stay valid.
        targets.sort_by(|a, b| b.offset.cmp(&a.offset));
        targets.dedup_by_key(|declaration| declaration.offset);

        let mut removed = 0;
        for declaration in targets {
            let end = declaration.end();
            if self.buffer().slice(declaration.offset, end) != declaration.text {
                continue;
            }
            let buffer = self.buffer();
            let at_line_start =
                buffer.line_start(buffer.line_of_offset(declaration.offset)) == declaration.offset;
            let start = if at_line_start {
                declaration.offset.saturating_sub(1)
            } else {
                declaration.offset
            };
            self.delete(start, end - start)?;
            removed += 1;
        }
        Ok(removed)
    }
}
