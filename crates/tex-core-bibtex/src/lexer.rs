//! Lexer for BibTeX databases.
//!
//! BibTeX has almost no lexical structure: a handful of delimiters and everything else is
//! free text. Whitespace is lexed as trivia and dropped by [`Lexer`]; the parser slices the
//! source directly when it needs delimited field contents verbatim.

use logos::Logos;
use std::ops::Range;

/// All token kinds of a BibTeX database.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenKind {
    /// Spaces, tabs and line breaks.
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    /// `@`, the start of an entry.
    #[token("@")]
    At,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `,`
    #[token(",")]
    Comma,
    /// `=`
    #[token("=")]
    Equals,
    /// `#`, value concatenation.
    #[token("#")]
    Hash,
    /// `"`
    #[token("\"")]
    Quote,

    /// A run of anything else: entry types, keys, field names, numbers, macro names and the
    /// words of field values.
    #[regex(r#"[^ \t\r\n\f@{}()",=#]+"#)]
    Text,

    /// Input the lexer could not classify.
    #[default]
    Error,
}

impl TokenKind {
    /// Returns `true` for tokens the parser never looks at.
    pub fn is_trivia(self) -> bool {
        self == Self::Whitespace
    }
}

/// A token and its byte range in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Byte range in the source.
    pub span: Range<usize>,
}

/// Iterator over the non-trivia tokens of a source text.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
}

impl<'src> Lexer<'src> {
    /// Create a lexer over `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let kind = self.inner.next()?.unwrap_or(TokenKind::Error);
            if !kind.is_trivia() {
                return Some(Token {
                    kind,
                    span: self.inner.span(),
                });
            }
        }
    }
}

/// Lex the entire source, dropping trivia.
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, &str)> {
        lex(source)
            .into_iter()
            .map(|token| (token.kind, &source[token.span]))
            .collect()
    }

    #[test]
    fn entry_header() {
        assert_eq!(
            kinds("@article{knuth:84,"),
            vec![
                (TokenKind::At, "@"),
                (TokenKind::Text, "article"),
                (TokenKind::LBrace, "{"),
                (TokenKind::Text, "knuth:84"),
                (TokenKind::Comma, ","),
            ]
        );
    }

    #[test]
    fn whitespace_is_dropped() {
        assert_eq!(
            kinds("  title = \"A\" # b\n"),
            vec![
                (TokenKind::Text, "title"),
                (TokenKind::Equals, "="),
                (TokenKind::Quote, "\""),
                (TokenKind::Text, "A"),
                (TokenKind::Quote, "\""),
                (TokenKind::Hash, "#"),
                (TokenKind::Text, "b"),
            ]
        );
    }

    #[test]
    fn non_ascii_text() {
        assert_eq!(kinds("Gödel–Escher"), vec![(TokenKind::Text, "Gödel–Escher")]);
    }
}
