//! Whole-file line trivia mapping.
//!
//! The final trivia pass, run once per whole document after the target
//! tree is fully built. Where the porter relocates trivia by tree
//! position, this pass maps by source physical line number: whatever the
//! porter did not resolve is attached to the target token that the line
//! tables say begins or ends the corresponding line.
//!
//! Source lines are processed in descending order so each replacement
//! produces the tree the next (lower-numbered) line's lookup runs against;
//! a replacement must never be invalidated by trivia still to be added
//! below it.
//!
//! Lines with no discoverable target line are skipped and their trivia is
//! lost — a documented, accepted limitation (the source line may have been
//! elided entirely during semantic conversion). Trivia occurring strictly
//! inside a single target line (mid-statement block comments) is out of
//! scope.

use rustc_hash::FxHashMap;
use tracing::debug;

use cs2vb_syntax::{Span, SyntaxNode, Token, TokenId};

use crate::porter::TriviaPorter;
use crate::TriviaError;

/// Map remaining source trivia onto the target tree by physical line.
///
/// `source` must be the tree the porter was created for (the porter holds
/// that document's line table and the record of what it already resolved).
pub fn map_source_trivia_to_target(
    source: &SyntaxNode,
    target: SyntaxNode,
    porter: &mut TriviaPorter,
) -> Result<SyntaxNode, TriviaError> {
    let line_count = porter.source_line_index().line_count();

    // Target-side tables, built from the source-line annotations stamped
    // during node conversion. Document order makes the first hit the
    // minimal target position (used for leading trivia) and the last hit
    // the maximal (used for trailing trivia).
    let mut leading_dest: FxHashMap<u32, TokenId> = FxHashMap::default();
    let mut trailing_dest: FxHashMap<u32, TokenId> = FxHashMap::default();
    for token in target.tokens() {
        if let Some((first, last)) = token.annotations().source_lines() {
            leading_dest.entry(first).or_insert_with(|| token.id());
            trailing_dest.insert(last, token.id());
        }
    }

    // Source-side tables: the token starting each line and the token
    // ending each line.
    let mut starts_line: FxHashMap<u32, &Token> = FxHashMap::default();
    let mut ends_line: FxHashMap<u32, &Token> = FxHashMap::default();
    for token in source.tokens() {
        let span = token.span();
        if span == Span::DUMMY {
            continue;
        }
        let index = porter.source_line_index();
        let start_line = index.line_of(span.start);
        let end_line = index.line_of(span.end.saturating_sub(1).max(span.start));
        starts_line.entry(start_line).or_insert(token);
        ends_line.insert(end_line, token);
    }

    let mut target = target;
    for line in (0..line_count).rev() {
        // Trailing trivia of the token ending this line.
        if let Some(&source_token) = ends_line.get(&line) {
            if source_token.trailing().has_substantive()
                && !porter.was_trailing_resolved(source_token.id())
            {
                match trailing_dest.get(&line) {
                    Some(&dest) => {
                        let run = porter
                            .translator_mut()
                            .translate_run(source_token.trailing())?;
                        target = replace_trailing(target, dest, run);
                        porter.clear_delegation(source_token.id());
                    }
                    None => {
                        debug!(line, "no target line for trailing trivia; dropped");
                    }
                }
            }
        }

        // Leading trivia of the token starting this line.
        if let Some(&source_token) = starts_line.get(&line) {
            if source_token.leading().has_substantive()
                && !porter.was_leading_ported(source_token.id())
            {
                match leading_dest.get(&line) {
                    Some(&dest) => {
                        let run = porter
                            .translator_mut()
                            .translate_run(source_token.leading())?;
                        target = replace_leading(target, dest, run);
                        porter.mark_leading_ported(source_token.id());
                    }
                    None => {
                        debug!(line, "no target line for leading trivia; dropped");
                    }
                }
            }
        }
    }

    Ok(target)
}

fn replace_trailing(
    target: SyntaxNode,
    dest: TokenId,
    run: cs2vb_syntax::TriviaList,
) -> SyntaxNode {
    match target.token_by_id(dest) {
        Some(token) => {
            let updated = token.with_trailing_trivia(run);
            target.replace_token(dest, updated)
        }
        None => target,
    }
}

fn replace_leading(target: SyntaxNode, dest: TokenId, run: cs2vb_syntax::TriviaList) -> SyntaxNode {
    match target.token_by_id(dest) {
        Some(token) => {
            let updated = token.with_leading_trivia(run);
            target.replace_token(dest, updated)
        }
        None => target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs2vb_syntax::{NodeKind, SyntaxFactory, SyntaxNode, TokenKind, TriviaKind};
    use pretty_assertions::assert_eq;

    /// Source: `x = 1; // one\ny = 2; // two\n`
    /// Conversion elides the second statement entirely.
    fn build_source(factory: &mut SyntaxFactory) -> (SyntaxNode, String) {
        let text = "x = 1; // one\ny = 2; // two\n";
        let x = factory.token(TokenKind::Identifier, "x", &[], &[(TriviaKind::Whitespace, " ")]);
        let eq = factory.token(TokenKind::Equals, "=", &[], &[(TriviaKind::Whitespace, " ")]);
        let one = factory.token(TokenKind::IntLiteral, "1", &[], &[]);
        let semi = factory.token(
            TokenKind::Semicolon,
            ";",
            &[],
            &[
                (TriviaKind::Whitespace, " "),
                (TriviaKind::LineComment, "// one"),
                (TriviaKind::EndOfLine, "\n"),
            ],
        );
        let stmt1 = SyntaxNode::new(
            NodeKind::ExpressionStatement,
            vec![x.into(), eq.into(), one.into(), semi.into()],
        );

        let y = factory.token(TokenKind::Identifier, "y", &[], &[(TriviaKind::Whitespace, " ")]);
        let eq2 = factory.token(TokenKind::Equals, "=", &[], &[(TriviaKind::Whitespace, " ")]);
        let two = factory.token(TokenKind::IntLiteral, "2", &[], &[]);
        let semi2 = factory.token(
            TokenKind::Semicolon,
            ";",
            &[],
            &[
                (TriviaKind::Whitespace, " "),
                (TriviaKind::LineComment, "// two"),
                (TriviaKind::EndOfLine, "\n"),
            ],
        );
        let stmt2 = SyntaxNode::new(
            NodeKind::ExpressionStatement,
            vec![y.into(), eq2.into(), two.into(), semi2.into()],
        );

        (
            SyntaxNode::new(NodeKind::CompilationUnit, vec![stmt1.into(), stmt2.into()]),
            text.to_owned(),
        )
    }

    #[test]
    fn test_trailing_trivia_mapped_by_line() {
        let mut factory = SyntaxFactory::new();
        let (source, text) = build_source(&mut factory);
        let mut porter = TriviaPorter::new(&text);

        // Target keeps only the first statement, stamped as line 0.
        let x = factory.synthetic(TokenKind::Identifier, "x");
        let eq = factory.synthetic(TokenKind::Equals, "=");
        let one = factory.synthetic(TokenKind::IntLiteral, "1");
        let one = one.with_source_lines(0, 0);
        let target = SyntaxNode::new(
            NodeKind::CompilationUnit,
            vec![x.with_source_lines(0, 0).into(), eq.into(), one.into()],
        );

        let mapped = map_source_trivia_to_target(&source, target, &mut porter)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(mapped.text(), "x=1 ' one\n");
    }

    #[test]
    fn test_elided_line_is_skipped_without_error() {
        let mut factory = SyntaxFactory::new();
        let (source, text) = build_source(&mut factory);
        let mut porter = TriviaPorter::new(&text);

        // No target token maps to line 1 (the `y` statement was elided);
        // its comment is dropped, not crashed on.
        let x = factory.synthetic(TokenKind::Identifier, "x").with_source_lines(0, 0);
        let target = SyntaxNode::new(NodeKind::CompilationUnit, vec![x.into()]);

        let mapped = map_source_trivia_to_target(&source, target, &mut porter)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(mapped.text(), "x ' one\n");
        assert!(!mapped.text().contains("two"));
    }
}
