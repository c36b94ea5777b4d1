//! Snippet insertion with placeholder selection.
//!
//! Snippet templates mark insertion points with [`PLACEHOLDER`]. After inserting, the first
//! remaining placeholder is returned as the range the host should select.

use std::ops::Range;

use crate::document::Document;
use crate::error::DocumentError;
use crate::placeholders::PLACEHOLDER;
use crate::text::leading_whitespace;

impl Document {
    /// Turn `template` into the text that [`Document::insert_snippet`] would insert over
    /// `selection`.
    ///
    /// - tabs become spaces when the editing settings ask for it
    /// - a template with exactly one placeholder gets it replaced by the selected text
    /// - with `indent`, continuation lines get the leading whitespace of the line the
    ///   selection starts on
    pub fn prepare_snippet(&self, template: &str, selection: Range<usize>, indent: bool) -> String {
        let buffer = self.buffer();
        let mut text = if self.config().spaces_instead_of_tabs {
            template.replace('\t', &" ".repeat(self.config().tab_width))
        } else {
            template.to_string()
        };

        if text.matches(PLACEHOLDER).count() == 1 && !selection.is_empty() {
            let selected = buffer.slice(selection.start, selection.end);
            if !selected.is_empty() {
                text = text.replacen(PLACEHOLDER, &selected, 1);
            }
        }

        if indent {
            let line = buffer.line_of_offset(selection.start);
            let prefix = buffer.slice(buffer.line_start(line), selection.start);
            let whitespace = leading_whitespace(&prefix);
            if !whitespace.is_empty() {
                text = text.replace('\n', &format!("\n{whitespace}"));
            }
        }

        text
    }

    /// Replace `selection` with the prepared snippet.
    ///
    /// Returns the first placeholder of the inserted text, if there is one.
    pub fn insert_snippet(
        &mut self,
        selection: Range<usize>,
        template: &str,
        indent: bool,
    ) -> Result<Option<Range<usize>>, DocumentError> {
        let text = self.prepare_snippet(template, selection.clone(), indent);
        self.replace_and_find_placeholder(selection, &text)
    }

    /// Wrap the selection in `before` / `after`, or insert `before•after` at the cursor when
    /// nothing is selected.
    pub fn insert_before_after(
        &mut self,
        selection: Range<usize>,
        before: &str,
        after: &str,
    ) -> Result<Option<Range<usize>>, DocumentError> {
        if selection.is_empty() {
            let template = format!("{before}{PLACEHOLDER}{after}");
            return self.insert_snippet(selection, &template, true);
        }
        let selected = self.buffer().slice(selection.start, selection.end);
        let text = format!("{before}{selected}{after}");
        self.replace_and_find_placeholder(selection, &text)
    }

    /// Insert `text` on its own lines before the last `\end{document}`, or as an indented
    /// snippet over `selection` when the document has no end marker.
    pub fn insert_before_document_end(
        &mut self,
        selection: Range<usize>,
        text: &str,
    ) -> Result<Option<Range<usize>>, DocumentError> {
        let content = self.text();
        match content.rfind(DOCUMENT_END) {
            Some(byte) => {
                let at = content[..byte].chars().count();
                self.insert_snippet(at..at, &format!("\n{text}\n\n"), false)
            }
            None => self.insert_snippet(selection, text, true),
        }
    }

    fn replace_and_find_placeholder(
        &mut self,
        selection: Range<usize>,
        text: &str,
    ) -> Result<Option<Range<usize>>, DocumentError> {
        self.replace(selection.start, selection.len(), text)?;
        Ok(text
            .chars()
            .position(|c| c == PLACEHOLDER)
            .map(|index| selection.start + index..selection.start + index + 1))
    }
}

const DOCUMENT_END: &str = "\\end{document}";

#[cfg(test)]
mod tests {
    use crate::config::EditingConfig;
    use crate::document::Document;
    use crate::symbols::SymbolIndexer;
    use tex_core_lang::Language;

    #[test]
    fn indents_continuation_lines_and_selects_first_dot() {
        let mut doc = Document::new("  x");
        let selected = doc
            .insert_snippet(2..2, "\\begin{itemize}\n\t\\item •\n\\end{itemize}", true)
            .unwrap();
        assert_eq!(
            doc.text(),
            "  \\begin{itemize}\n  \t\\item •\n  \\end{itemize}x"
        );
        assert_eq!(selected, Some(27..28));
    }

    #[test]
    fn single_dot_takes_the_selection() {
        let mut doc = Document::new("see word here");
        let selected = doc.insert_snippet(4..8, "\\emph{•}", true).unwrap();
        assert_eq!(doc.text(), "see \\emph{word} here");
        assert_eq!(selected, None);
    }

    #[test]
    fn several_dots_keep_the_template() {
        let mut doc = Document::new("ab");
        let selected = doc.insert_snippet(0..1, "\\frac{•}{•}", false).unwrap();
        assert_eq!(doc.text(), "\\frac{•}{•}b");
        assert_eq!(selected, Some(6..7));
    }

    #[test]
    fn tabs_become_spaces_when_configured() {
        let config = EditingConfig {
            tab_width: 2,
            spaces_instead_of_tabs: true,
        };
        let mut doc = Document::with_indexer(Language::Latex, config, SymbolIndexer::latex(), "");
        doc.insert_snippet(0..0, "\t•", false).unwrap();
        assert_eq!(doc.text(), "  •");
    }

    #[test]
    fn before_after_wraps_selection() {
        let mut doc = Document::new("bold");
        assert_eq!(doc.insert_before_after(0..4, "\\textbf{", "}").unwrap(), None);
        assert_eq!(doc.text(), "\\textbf{bold}");

        let mut doc = Document::new("");
        assert_eq!(
            doc.insert_before_after(0..0, "\\textit{", "}").unwrap(),
            Some(8..9)
        );
        assert_eq!(doc.text(), "\\textit{•}");
    }

    #[test]
    fn before_document_end() {
        let mut doc = Document::new("\\begin{document}\n\\end{document}\n");
        doc.insert_before_document_end(0..0, "\\bibliography{•}").unwrap();
        assert_eq!(
            doc.text(),
            "\\begin{document}\n\n\\bibliography{•}\n\n\\end{document}\n"
        );

        let mut doc = Document::new("no end");
        doc.insert_before_document_end(6..6, "!").unwrap();
        assert_eq!(doc.text(), "no end!");
    }
}
