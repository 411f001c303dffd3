//! Tokens.
//!
//! A token is an atomic lexical unit owning a leading trivia run and a
//! trailing trivia run. Tokens are immutable: every edit returns a new
//! `Token` value, and the owning subtree is rebuilt functionally.
//!
//! Tokens carry a per-document [`TokenId`] issued by the factory. The id is
//! preserved across functional edits, which is what lets the porter's
//! latest-delegation map refer to "the same source token" without relying on
//! object identity.

use std::fmt;
use std::sync::Arc;

use crate::{Annotations, ConversionId, Span, TriviaList};

/// Per-document token identity. Survives functional edits.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TokenId(u32);

impl TokenId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        TokenId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tok#{}", self.0)
    }
}

/// Token kinds.
///
/// One closed enumeration serves both trees: the trivia subsystem observes
/// source (C#-shaped) and target (VB-shaped) tokens through the same kind
/// set, and only ever dispatches on the handful of structural kinds below.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    Identifier,
    IntLiteral,
    StringLiteral,
    // Keywords (both languages)
    IfKeyword,
    ThenKeyword,
    ElseKeyword,
    EndKeyword,
    ReturnKeyword,
    DimKeyword,
    // Punctuation
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Semicolon,
    Equals,
    Plus,
    Eof,
}

impl TokenKind {
    /// Whether this token opens a block body.
    ///
    /// In the source grammar that is the brace; in the target grammar the
    /// block "opens" at the `Then` keyword ending the header line.
    #[inline]
    pub fn is_block_open(self) -> bool {
        matches!(self, TokenKind::OpenBrace | TokenKind::ThenKeyword)
    }

    /// Whether this token is a brace-style delimiter (as opposed to a
    /// keyword that merely marks where the block begins).
    #[inline]
    pub fn is_brace_delimiter(self) -> bool {
        matches!(self, TokenKind::OpenBrace | TokenKind::CloseBrace)
    }
}

/// An atomic lexical unit with its trivia runs and annotations.
#[derive(Clone, Eq, PartialEq)]
pub struct Token {
    id: TokenId,
    kind: TokenKind,
    text: Arc<str>,
    span: Span,
    leading: TriviaList,
    trailing: TriviaList,
    annotations: Annotations,
}

impl Token {
    /// Create a new token. Prefer [`crate::SyntaxFactory`], which issues
    /// document-unique ids and assigns spans.
    pub fn new(
        id: TokenId,
        kind: TokenKind,
        text: impl Into<Arc<str>>,
        span: Span,
        leading: TriviaList,
        trailing: TriviaList,
    ) -> Self {
        Token {
            id,
            kind,
            text: text.into(),
            span,
            leading,
            trailing,
            annotations: Annotations::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> TokenId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.span
    }

    #[inline]
    pub fn leading(&self) -> &TriviaList {
        &self.leading
    }

    #[inline]
    pub fn trailing(&self) -> &TriviaList {
        &self.trailing
    }

    #[inline]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// New token with the leading run replaced.
    #[must_use]
    pub fn with_leading_trivia(&self, leading: TriviaList) -> Token {
        let mut token = self.clone();
        token.leading = leading;
        token
    }

    /// New token with the trailing run replaced.
    #[must_use]
    pub fn with_trailing_trivia(&self, trailing: TriviaList) -> Token {
        let mut token = self.clone();
        token.trailing = trailing;
        token
    }

    /// New token with a run prepended to the existing leading run.
    #[must_use]
    pub fn with_prepended_leading(&self, run: &TriviaList) -> Token {
        self.with_leading_trivia(self.leading.prepended(run))
    }

    /// New token with a run appended after the existing trailing run.
    #[must_use]
    pub fn with_appended_trailing(&self, run: &TriviaList) -> Token {
        self.with_trailing_trivia(self.trailing.appended(run))
    }

    /// New token with a run inserted at the end of the current physical
    /// line: before the first line break in the existing trailing run, or
    /// appended when the run has none.
    ///
    /// When the insertion point already has a following line break, any
    /// trailing line breaks on `run` are dropped so no blank line appears.
    #[must_use]
    pub fn with_trailing_at_line_end(&self, run: &TriviaList) -> Token {
        let (head, tail) = self.trailing.split_at_first_newline();
        let trailing = if tail.is_empty() {
            head.appended(run)
        } else {
            head.appended(&run.without_trailing_newlines()).appended(&tail)
        };
        self.with_trailing_trivia(trailing)
    }

    /// New token with a trailing-port annotation attached.
    #[must_use]
    pub fn with_port_annotation(&self, id: ConversionId) -> Token {
        let mut token = self.clone();
        token.annotations = token.annotations.with_port(id);
        token
    }

    /// New token with a specific trailing-port annotation removed.
    #[must_use]
    pub fn without_port_annotation(&self, id: ConversionId) -> Token {
        let mut token = self.clone();
        token.annotations = token.annotations.without_port(id);
        token
    }

    /// New token with the source line range stamped (merging).
    #[must_use]
    pub fn with_source_lines(&self, first: u32, last: u32) -> Token {
        let mut token = self.clone();
        token.annotations = token.annotations.with_source_lines(first, last);
        token
    }

    /// Source rendering: leading trivia, token text, trailing trivia.
    pub fn render(&self) -> String {
        let mut out = self.leading.render();
        out.push_str(&self.text);
        out.push_str(&self.trailing.render());
        out
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {:?} @ {}", self.id, self.kind, self.text, self.span)
    }
}
