//! Trivia values and trivia runs.
//!
//! Trivia is every non-code token attachment the converter must carry from
//! the C# tree to the Visual Basic tree: whitespace, line breaks, comments,
//! documentation comments, and preprocessor directives. Each token owns an
//! ordered leading run and an ordered trailing run of trivia.
//!
//! The kind enumeration is closed and exhaustively matched by the
//! translator; an unhandled kind is a compile error here, not a runtime
//! fallthrough. The one deliberate runtime escape hatch is
//! [`TriviaKind::None`], which the translator rejects with its fail-fast
//! "unimplemented trivia kind" error.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::Span;

/// Directive kinds the converter cannot translate structurally.
///
/// These degrade to a marker comment carrying the verbatim source text, so
/// the information survives even though the directive does not.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnsupportedKind {
    /// `#line` directives.
    Line,
    /// `#pragma warning` directives.
    PragmaWarning,
    /// `#error` directives.
    Error,
    /// Skipped-tokens runs inside a disabled region.
    SkippedTokens,
    /// An unrecognized or malformed directive.
    Bad,
}

/// Preprocessor directive kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DirectiveKind {
    /// `#if`
    If,
    /// `#elif`
    ElseIf,
    /// `#else`
    Else,
    /// `#endif`
    EndIf,
    /// `#region`
    Region,
    /// `#endregion`
    EndRegion,
    /// `#define`
    Define,
    /// `#undef`
    Undef,
    /// `#pragma checksum`
    Checksum,
    /// Everything the target grammar has no equivalent for.
    Unsupported(UnsupportedKind),
}

/// The kind of a trivia value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TriviaKind {
    /// Horizontal whitespace.
    Whitespace,
    /// A line break.
    EndOfLine,
    /// `// …` in the source language, `' …` in the target.
    LineComment,
    /// `/* … */`; has no target equivalent and is split into line comments.
    BlockComment,
    /// `/// …` documentation comment, `''' …` in the target.
    DocCommentLine,
    /// `/** … */` documentation comment block.
    DocCommentBlock,
    /// The per-physical-line doc-comment prefix marker (`///` or `'''`).
    DocExterior,
    /// A preprocessor directive.
    Directive(DirectiveKind),
    /// Absent trivia. Reaching the translator with this kind is a hard error.
    None,
}

impl TriviaKind {
    /// Substantive trivia is anything that is not pure layout.
    ///
    /// The deferred porter only creates conversion records for tokens whose
    /// trailing run contains substantive trivia. [`TriviaKind::None`]
    /// counts as substantive so that it reaches the translator's fail-fast
    /// rejection instead of being skipped as layout.
    #[inline]
    pub fn is_substantive(self) -> bool {
        !matches!(self, TriviaKind::Whitespace | TriviaKind::EndOfLine)
    }

    /// Comment-like trivia must be followed by a line break in the target
    /// grammar, since everything after `'` belongs to the same logical line.
    #[inline]
    pub fn needs_line_break(self) -> bool {
        matches!(
            self,
            TriviaKind::LineComment
                | TriviaKind::BlockComment
                | TriviaKind::DocCommentLine
                | TriviaKind::DocCommentBlock
                | TriviaKind::Directive(_)
        )
    }

    #[inline]
    pub fn is_end_of_line(self) -> bool {
        matches!(self, TriviaKind::EndOfLine)
    }

    #[inline]
    pub fn is_directive(self) -> bool {
        matches!(self, TriviaKind::Directive(_))
    }
}

/// An atomic non-code token attachment.
///
/// Immutable; the text is shared so trivia values clone cheaply when tokens
/// are rebuilt.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Trivia {
    kind: TriviaKind,
    text: Arc<str>,
    span: Span,
}

impl Trivia {
    /// Create a new trivia value.
    pub fn new(kind: TriviaKind, text: impl Into<Arc<str>>, span: Span) -> Self {
        Trivia {
            kind,
            text: text.into(),
            span,
        }
    }

    /// A synthesized trivia value with no source location.
    pub fn synthetic(kind: TriviaKind, text: impl Into<Arc<str>>) -> Self {
        Trivia::new(kind, text, Span::DUMMY)
    }

    /// A single synthesized space.
    pub fn space() -> Self {
        Trivia::synthetic(TriviaKind::Whitespace, " ")
    }

    /// A synthesized line break.
    pub fn end_of_line() -> Self {
        Trivia::synthetic(TriviaKind::EndOfLine, "\n")
    }

    /// A synthesized target-language line comment (text includes the `'`).
    pub fn line_comment(text: impl Into<Arc<str>>) -> Self {
        Trivia::synthetic(TriviaKind::LineComment, text)
    }

    #[inline]
    pub fn kind(&self) -> TriviaKind {
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
    pub fn is_substantive(&self) -> bool {
        self.kind.is_substantive()
    }

    /// The comment body with the delimiters stripped.
    ///
    /// - `// hello` → ` hello`
    /// - `/* hello */` → ` hello ` (both markers stripped, no line handling)
    /// - `/// <summary>` → ` <summary>`
    /// - `' hello` → ` hello`
    /// - `''' <summary>` → ` <summary>`
    ///
    /// Non-comment trivia returns the raw text unchanged.
    pub fn body(&self) -> &str {
        let text = self.text.as_ref();
        match self.kind {
            TriviaKind::DocCommentLine => text
                .strip_prefix("///")
                .or_else(|| text.strip_prefix("'''"))
                .unwrap_or(text),
            TriviaKind::LineComment => text
                .strip_prefix("//")
                .or_else(|| text.strip_prefix('\''))
                .unwrap_or(text),
            TriviaKind::BlockComment | TriviaKind::DocCommentBlock => {
                let inner = text
                    .strip_prefix("/**")
                    .or_else(|| text.strip_prefix("/*"))
                    .unwrap_or(text);
                inner.strip_suffix("*/").unwrap_or(inner)
            }
            _ => text,
        }
    }
}

impl fmt::Debug for Trivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} @ {}", self.kind, self.text, self.span)
    }
}

/// An ordered run of trivia attached to one side of a token.
///
/// Most tokens carry zero to two trivia, so the run is inline-allocated.
/// All edits are functional: they return a new list.
#[derive(Clone, Eq, PartialEq, Default)]
pub struct TriviaList {
    trivia: SmallVec<[Trivia; 2]>,
}

impl TriviaList {
    /// Create a new empty run.
    #[inline]
    pub fn new() -> Self {
        TriviaList {
            trivia: SmallVec::new(),
        }
    }

    /// Create from a Vec of trivia.
    #[inline]
    pub fn from_vec(trivia: Vec<Trivia>) -> Self {
        TriviaList {
            trivia: SmallVec::from_vec(trivia),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.trivia.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trivia.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Trivia> {
        self.trivia.get(index)
    }

    #[inline]
    pub fn first(&self) -> Option<&Trivia> {
        self.trivia.first()
    }

    #[inline]
    pub fn last(&self) -> Option<&Trivia> {
        self.trivia.last()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Trivia> {
        self.trivia.iter()
    }

    /// Push a trivia value (building-phase mutation).
    #[inline]
    pub fn push(&mut self, trivia: Trivia) {
        self.trivia.push(trivia);
    }

    /// Whether the run contains any substantive (non-layout) trivia.
    pub fn has_substantive(&self) -> bool {
        self.trivia.iter().any(Trivia::is_substantive)
    }

    /// Whether the run ends with a line break.
    pub fn ends_with_newline(&self) -> bool {
        matches!(self.trivia.last(), Some(t) if t.kind().is_end_of_line())
    }

    /// New run with `other` appended after this run.
    #[must_use]
    pub fn appended(&self, other: &TriviaList) -> TriviaList {
        let mut trivia = self.trivia.clone();
        trivia.extend(other.trivia.iter().cloned());
        TriviaList { trivia }
    }

    /// New run with `other` inserted before this run.
    #[must_use]
    pub fn prepended(&self, other: &TriviaList) -> TriviaList {
        other.appended(self)
    }

    /// New run split at the first line break: everything before it, and the
    /// rest starting with that line break.
    ///
    /// Used when trailing content must land at the end of the current
    /// physical line rather than after it.
    pub fn split_at_first_newline(&self) -> (TriviaList, TriviaList) {
        match self
            .trivia
            .iter()
            .position(|t| t.kind().is_end_of_line())
        {
            Some(pos) => (
                TriviaList {
                    trivia: self.trivia[..pos].iter().cloned().collect(),
                },
                TriviaList {
                    trivia: self.trivia[pos..].iter().cloned().collect(),
                },
            ),
            None => (self.clone(), TriviaList::new()),
        }
    }

    /// New run with any trailing line breaks removed.
    #[must_use]
    pub fn without_trailing_newlines(&self) -> TriviaList {
        let mut trivia = self.trivia.clone();
        while matches!(trivia.last(), Some(t) if t.kind().is_end_of_line()) {
            trivia.pop();
        }
        TriviaList { trivia }
    }

    /// Total source text of the run.
    pub fn render(&self) -> String {
        self.trivia.iter().map(Trivia::text).collect()
    }
}

impl fmt::Debug for TriviaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.trivia.iter()).finish()
    }
}

impl FromIterator<Trivia> for TriviaList {
    fn from_iter<I: IntoIterator<Item = Trivia>>(iter: I) -> Self {
        TriviaList {
            trivia: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TriviaList {
    type Item = Trivia;
    type IntoIter = smallvec::IntoIter<[Trivia; 2]>;

    fn into_iter(self) -> Self::IntoIter {
        self.trivia.into_iter()
    }
}

impl<'a> IntoIterator for &'a TriviaList {
    type Item = &'a Trivia;
    type IntoIter = std::slice::Iter<'a, Trivia>;

    fn into_iter(self) -> Self::IntoIter {
        self.trivia.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_comment_body() {
        let t = Trivia::synthetic(TriviaKind::LineComment, "// hello");
        assert_eq!(t.body(), " hello");
    }

    #[test]
    fn test_block_comment_body() {
        let t = Trivia::synthetic(TriviaKind::BlockComment, "/* hello */");
        assert_eq!(t.body(), " hello ");
    }

    #[test]
    fn test_doc_comment_body() {
        let t = Trivia::synthetic(TriviaKind::DocCommentLine, "/// <summary>");
        assert_eq!(t.body(), " <summary>");
        let t = Trivia::synthetic(TriviaKind::DocCommentLine, "''' <summary>");
        assert_eq!(t.body(), " <summary>");
    }

    #[test]
    fn test_substantive() {
        assert!(!Trivia::space().is_substantive());
        assert!(!Trivia::end_of_line().is_substantive());
        assert!(Trivia::line_comment("' x").is_substantive());
        let list = TriviaList::from_vec(vec![Trivia::space(), Trivia::end_of_line()]);
        assert!(!list.has_substantive());
    }

    #[test]
    fn test_split_at_first_newline() {
        let list = TriviaList::from_vec(vec![
            Trivia::space(),
            Trivia::end_of_line(),
            Trivia::line_comment("' tail"),
        ]);
        let (head, tail) = list.split_at_first_newline();
        assert_eq!(head.len(), 1);
        assert_eq!(tail.len(), 2);
        assert!(tail.first().is_some_and(|t| t.kind().is_end_of_line()));
    }
}
