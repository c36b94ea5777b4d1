//! Strict recursive-descent parser for BibTeX databases.
//!
//! Accepted input:
//!
//! ```text
//! database := (junk | entry)*
//! entry    := '@' type ( '{' body '}' | '(' body ')' )
//! body     := key (',' field)* ','?          regular entries
//!           | name '=' value                  @string
//!           | value                           @preamble
//!           | <balanced text>                 @comment
//! field    := name '=' value
//! value    := piece ('#' piece)*
//! piece    := number | macro | '{' <balanced text> '}' | '"' <text> '"'
//! ```
//!
//! Text outside entries is ignored, including an `@` that is not followed by a type and an
//! opening delimiter. Any malformed entry fails the whole parse; error offsets are character
//! offsets into the source.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::lexer::{Lexer, Token, TokenKind};

/// Reasons a database was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BibParseError {
    #[error("expected {expected} at offset {offset}, found `{found}`")]
    /// A token other than the expected one was found.
    Unexpected {
        /// What the parser was looking for.
        expected: &'static str,
        /// Source text of the offending token.
        found: String,
        /// Character offset of the offending token.
        offset: usize,
    },

    #[error("expected {expected} at offset {offset}, found end of input")]
    /// The input ended inside an entry.
    UnexpectedEnd {
        /// What the parser was looking for.
        expected: &'static str,
        /// Character length of the input.
        offset: usize,
    },

    #[error("`{delimiter}` at offset {offset} is never closed")]
    /// A delimited value or comment runs to the end of the input.
    Unclosed {
        /// The opening delimiter.
        delimiter: char,
        /// Character offset of the opening delimiter.
        offset: usize,
    },
}

impl BibParseError {
    /// Character offset the error was detected at.
    pub fn offset(&self) -> usize {
        match self {
            Self::Unexpected { offset, .. }
            | Self::UnexpectedEnd { offset, .. }
            | Self::Unclosed { offset, .. } => *offset,
        }
    }
}

/// One `name = value` pair of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Lowercased field name.
    pub name: String,
    /// Field value with macros expanded, pieces concatenated and whitespace runs folded.
    pub value: String,
}

/// A regular bibliography entry such as `@article{key, ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Lowercased entry type, e.g. `article`.
    pub entry_type: String,
    /// Citation key.
    pub key: String,
    /// Fields in source order.
    pub fields: Vec<Field>,
    /// Character offset of the entry's `@`.
    pub offset: usize,
}

impl Entry {
    /// Value of the first field called `name` (case-insensitive).
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
            .map(|field| field.value.as_str())
    }
}

/// A parsed database.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bibliography {
    /// Regular entries in source order.
    pub entries: Vec<Entry>,
    /// `@string` macros by lowercased name.
    pub strings: BTreeMap<String, String>,
    /// `@preamble` values in source order.
    pub preambles: Vec<String>,
}

impl Bibliography {
    /// Citation keys in source order; duplicates are kept.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    /// The first entry with citation key `key`.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.key == key)
    }
}

/// Parse a complete database.
pub fn parse(source: &str) -> Result<Bibliography, BibParseError> {
    let mut parser = Parser {
        source,
        tokens: Lexer::new(source).collect(),
        pos: 0,
        bibliography: Bibliography::default(),
    };
    parser.database()?;
    Ok(parser.bibliography)
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    bibliography: Bibliography,
}

impl<'src> Parser<'src> {
    fn database(&mut self) -> Result<(), BibParseError> {
        while let Some(token) = self.bump() {
            if token.kind == TokenKind::At && self.at_entry_header() {
                self.entry(&token)?;
            }
        }
        Ok(())
    }

    /// Whether the tokens after an `@` read `type {` or `type (`.
    fn at_entry_header(&self) -> bool {
        let kind = |offset: usize| self.tokens.get(self.pos + offset).map(|token| token.kind);
        kind(0) == Some(TokenKind::Text)
            && matches!(kind(1), Some(TokenKind::LBrace | TokenKind::LParen))
    }

    fn entry(&mut self, at: &Token) -> Result<(), BibParseError> {
        let entry_type = self.expect(TokenKind::Text, "entry type")?;
        let entry_type = self.text(&entry_type).to_ascii_lowercase();
        let open = match self.bump() {
            Some(token) if matches!(token.kind, TokenKind::LBrace | TokenKind::LParen) => token,
            Some(token) => return Err(self.unexpected("`{` or `(`", &token)),
            None => return Err(self.unexpected_end("`{` or `(`")),
        };
        let close = Delimiters::closing(open.kind);

        match entry_type.as_str() {
            "comment" => {
                self.skip_group(&open)?;
            }
            "preamble" => {
                let value = self.value()?;
                self.expect(close.kind, close.name)?;
                self.bibliography.preambles.push(value);
            }
            "string" => {
                let name = self.expect(TokenKind::Text, "macro name")?;
                let name = self.text(&name).to_ascii_lowercase();
                self.expect(TokenKind::Equals, "`=`")?;
                let value = self.value()?;
                self.optional(TokenKind::Comma);
                self.expect(close.kind, close.name)?;
                self.bibliography.strings.insert(name, value);
            }
            _ => {
                let key = self.expect(TokenKind::Text, "citation key")?;
                let mut entry = Entry {
                    entry_type,
                    key: self.text(&key).to_string(),
                    fields: Vec::new(),
                    offset: self.char_offset(at.span.start),
                };
                self.fields(&mut entry, close)?;
                self.bibliography.entries.push(entry);
            }
        }
        Ok(())
    }

    fn fields(&mut self, entry: &mut Entry, close: Delimiters) -> Result<(), BibParseError> {
        loop {
            match self.bump() {
                Some(token) if token.kind == close.kind => return Ok(()),
                Some(token) if token.kind == TokenKind::Comma => {
                    if self.optional(close.kind) {
                        return Ok(());
                    }
                    let name = self.expect(TokenKind::Text, "field name")?;
                    let name = self.text(&name).to_ascii_lowercase();
                    self.expect(TokenKind::Equals, "`=`")?;
                    let value = self.value()?;
                    entry.fields.push(Field { name, value });
                }
                Some(token) => return Err(self.unexpected(close.separator, &token)),
                None => return Err(self.unexpected_end(close.separator)),
            }
        }
    }

    fn value(&mut self) -> Result<String, BibParseError> {
        let mut value = self.piece()?;
        while self.optional(TokenKind::Hash) {
            value.push_str(&self.piece()?);
        }
        Ok(value.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    fn piece(&mut self) -> Result<String, BibParseError> {
        match self.bump() {
            Some(token) if token.kind == TokenKind::Text => {
                let text = self.text(&token);
                if text.chars().all(|c| c.is_ascii_digit()) {
                    Ok(text.to_string())
                } else {
                    let name = text.to_ascii_lowercase();
                    Ok(self
                        .bibliography
                        .strings
                        .get(&name)
                        .cloned()
                        .unwrap_or_else(|| text.to_string()))
                }
            }
            Some(token) if token.kind == TokenKind::LBrace => {
                let close = self.skip_group(&token)?;
                Ok(self.source[token.span.end..close.span.start].to_string())
            }
            Some(token) if token.kind == TokenKind::Quote => self.quoted(&token),
            Some(token) => Err(self.unexpected("field value", &token)),
            None => Err(self.unexpected_end("field value")),
        }
    }

    /// Body of a `"..."` piece. Braces inside must balance and may contain quotes.
    fn quoted(&mut self, open: &Token) -> Result<String, BibParseError> {
        let mut depth = 0usize;
        while let Some(token) = self.bump() {
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace if depth == 0 => {
                    return Err(self.unexpected("`\"`", &token));
                }
                TokenKind::RBrace => depth -= 1,
                TokenKind::Quote if depth == 0 => {
                    return Ok(self.source[open.span.end..token.span.start].to_string());
                }
                _ => {}
            }
        }
        Err(BibParseError::Unclosed {
            delimiter: '"',
            offset: self.char_offset(open.span.start),
        })
    }

    /// Consume up to and including the delimiter matching `open`, returning it.
    fn skip_group(&mut self, open: &Token) -> Result<Token, BibParseError> {
        let close = Delimiters::closing(open.kind);
        let mut depth = 1usize;
        while let Some(token) = self.bump() {
            if token.kind == open.kind {
                depth += 1;
            } else if token.kind == close.kind {
                depth -= 1;
                if depth == 0 {
                    return Ok(token);
                }
            }
        }
        Err(BibParseError::Unclosed {
            delimiter: close.opening,
            offset: self.char_offset(open.span.start),
        })
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(token)
    }

    fn optional(&mut self, kind: TokenKind) -> bool {
        if self.tokens.get(self.pos).is_some_and(|token| token.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, BibParseError> {
        match self.bump() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(self.unexpected(expected, &token)),
            None => Err(self.unexpected_end(expected)),
        }
    }

    fn text(&self, token: &Token) -> &'src str {
        &self.source[token.span.clone()]
    }

    fn char_offset(&self, byte: usize) -> usize {
        self.source[..byte].chars().count()
    }

    fn unexpected(&self, expected: &'static str, token: &Token) -> BibParseError {
        BibParseError::Unexpected {
            expected,
            found: self.text(token).to_string(),
            offset: self.char_offset(token.span.start),
        }
    }

    fn unexpected_end(&self, expected: &'static str) -> BibParseError {
        BibParseError::UnexpectedEnd {
            expected,
            offset: self.source.chars().count(),
        }
    }
}

/// The closing side of an entry or group delimiter pair.
#[derive(Debug, Clone, Copy)]
struct Delimiters {
    opening: char,
    kind: TokenKind,
    name: &'static str,
    separator: &'static str,
}

impl Delimiters {
    fn closing(open: TokenKind) -> Self {
        if open == TokenKind::LParen {
            Self {
                opening: '(',
                kind: TokenKind::RParen,
                name: "`)`",
                separator: "`,` or `)`",
            }
        } else {
            Self {
                opening: '{',
                kind: TokenKind::RBrace,
                name: "`}`",
                separator: "`,` or `}`",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DATABASE: &str = r#"
This text is ignored.
@string{tug = "TeX Users Group"}
@preamble{ "\newcommand{\noop}[1]{}" }
@comment{ @article{hidden, title = {Not an entry}} }

@Book{knuth84,
  author    = {Donald E. Knuth},
  title     = {The {\TeX}book},
  publisher = tug # ", Addison-Wesley",
  year      = 1984,
}

@article(lamport94,
  Title = "{LaTeX}: A Document
           Preparation System",
  month = jan
)
"#;

    #[test]
    fn parses_entries_strings_and_preambles() {
        let bib = parse(DATABASE).unwrap();
        assert_eq!(bib.keys().collect::<Vec<_>>(), vec!["knuth84", "lamport94"]);
        assert_eq!(bib.strings.get("tug").map(String::as_str), Some("TeX Users Group"));
        assert_eq!(bib.preambles, vec!["\\newcommand{\\noop}[1]{}".to_string()]);

        let knuth = bib.get("knuth84").unwrap();
        assert_eq!(knuth.entry_type, "book");
        assert_eq!(knuth.field("title"), Some("The {\\TeX}book"));
        assert_eq!(
            knuth.field("publisher"),
            Some("TeX Users Group, Addison-Wesley")
        );
        assert_eq!(knuth.field("year"), Some("1984"));

        let lamport = bib.get("lamport94").unwrap();
        assert_eq!(lamport.entry_type, "article");
        assert_eq!(
            lamport.field("TITLE"),
            Some("{LaTeX}: A Document Preparation System")
        );
        assert_eq!(lamport.field("month"), Some("jan"));
    }

    #[test]
    fn entry_offsets_are_characters() {
        let bib = parse("é @misc{a}\n@misc{b,}").unwrap();
        let offsets: Vec<_> = bib.entries.iter().map(|entry| entry.offset).collect();
        assert_eq!(offsets, vec![2, 11]);
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse("").unwrap(), Bibliography::default());
        assert!(parse("just prose, no entries").unwrap().entries.is_empty());
    }

    #[test]
    fn missing_separator() {
        assert_eq!(
            parse("é @book{k x}"),
            Err(BibParseError::Unexpected {
                expected: "`,` or `}`",
                found: "x".to_string(),
                offset: 10,
            })
        );
    }

    #[test]
    fn unclosed_value() {
        let err = parse("@book{k, title = {abc").unwrap_err();
        assert_eq!(
            err,
            BibParseError::Unclosed {
                delimiter: '{',
                offset: 17
            }
        );
        assert_eq!(err.offset(), 17);
    }

    #[test]
    fn truncated_entry() {
        assert_eq!(
            parse("@book{k, title = {T}"),
            Err(BibParseError::UnexpectedEnd {
                expected: "`,` or `}`",
                offset: 20
            })
        );
    }

    #[test]
    fn missing_key_and_delimiter() {
        assert!(matches!(
            parse("@book{, title = {T}}"),
            Err(BibParseError::Unexpected {
                expected: "citation key",
                ..
            })
        ));
        assert!(parse("@book key").unwrap().entries.is_empty());
    }

    #[test]
    fn at_sign_in_free_text_is_ignored() {
        let source = "Maintainer: me@example.org\n@book{knuth84, title = {T}}\nmail @ home\n";
        let bibliography = parse(source).unwrap();
        assert_eq!(bibliography.keys().collect::<Vec<_>>(), vec!["knuth84"]);
        assert_eq!(bibliography.entries[0].offset, 27);
    }

    #[test]
    fn stray_brace_in_quoted_value() {
        assert!(matches!(
            parse(r#"@misc{k, note = "a } b"}"#),
            Err(BibParseError::Unexpected { expected: "`\"`", .. })
        ));
    }
}
