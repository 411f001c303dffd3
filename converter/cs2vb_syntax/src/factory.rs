//! Per-document token construction.
//!
//! The factory issues document-unique token ids and, for tokens built from
//! source text, assigns byte spans from a running cursor that accounts for
//! trivia widths. Synthesized target tokens get dummy spans; their identity
//! is the id alone.

use crate::{Span, Token, TokenId, TokenKind, Trivia, TriviaKind, TriviaList};

/// Builds tokens for one document.
///
/// One factory per document; ids from different factories must not be
/// mixed within a conversion (the porter's maps key on them).
#[derive(Default)]
pub struct SyntaxFactory {
    next_id: u32,
    cursor: u32,
}

impl SyntaxFactory {
    /// Create a new factory with the cursor at offset zero.
    pub fn new() -> Self {
        SyntaxFactory {
            next_id: 0,
            cursor: 0,
        }
    }

    fn fresh_id(&mut self) -> TokenId {
        let id = TokenId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Current byte offset of the cursor.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.cursor
    }

    /// Build a source token at the current cursor, advancing it across the
    /// leading run, the token text, and the trailing run. Trivia get spans
    /// too, so physical lines can be recovered later.
    pub fn token(
        &mut self,
        kind: TokenKind,
        text: &str,
        leading: &[(TriviaKind, &str)],
        trailing: &[(TriviaKind, &str)],
    ) -> Token {
        let leading = self.trivia_run(leading);
        let start = self.cursor;
        self.cursor += u32::try_from(text.len()).unwrap_or(0);
        let span = Span::new(start, self.cursor);
        let trailing = self.trivia_run(trailing);
        Token::new(self.fresh_id(), kind, text, span, leading, trailing)
    }

    fn trivia_run(&mut self, parts: &[(TriviaKind, &str)]) -> TriviaList {
        let mut run = TriviaList::new();
        for (kind, text) in parts {
            let start = self.cursor;
            self.cursor += u32::try_from(text.len()).unwrap_or(0);
            run.push(Trivia::new(*kind, *text, Span::new(start, self.cursor)));
        }
        run
    }

    /// Build a synthesized (target) token with no source location and no
    /// trivia.
    pub fn synthetic(&mut self, kind: TokenKind, text: &str) -> Token {
        Token::new(
            self.fresh_id(),
            kind,
            text,
            Span::DUMMY,
            TriviaList::new(),
            TriviaList::new(),
        )
    }

    /// Build a synthesized token with explicit trivia runs.
    pub fn synthetic_with(
        &mut self,
        kind: TokenKind,
        text: &str,
        leading: TriviaList,
        trailing: TriviaList,
    ) -> Token {
        Token::new(self.fresh_id(), kind, text, Span::DUMMY, leading, trailing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_advance_over_trivia() {
        let mut factory = SyntaxFactory::new();
        let a = factory.token(
            TokenKind::Identifier,
            "abc",
            &[(TriviaKind::Whitespace, "  ")],
            &[(TriviaKind::EndOfLine, "\n")],
        );
        assert_eq!(a.span(), Span::new(2, 5));
        let b = factory.token(TokenKind::Identifier, "d", &[], &[]);
        assert_eq!(b.span(), Span::new(6, 7));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_synthetic_tokens_have_dummy_spans() {
        let mut factory = SyntaxFactory::new();
        let t = factory.synthetic(TokenKind::ThenKeyword, "Then");
        assert_eq!(t.span(), Span::DUMMY);
    }
}
