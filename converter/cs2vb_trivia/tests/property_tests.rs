//! Property-based tests for trivia porting.
//!
//! Generates N sequentially-numbered trailing comments across N source
//! statements, ports them in a randomly shuffled order, and verifies the
//! output preserves source order — the porter's ordering guarantee must
//! hold regardless of the order the bottom-up visitors happened to run in.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;

use cs2vb_syntax::{
    NodeKind, SyntaxFactory, SyntaxNode, TokenKind, Trivia, TriviaKind, TriviaList,
};
use cs2vb_trivia::TriviaPorter;

/// Build N statements `s0(); // c0` … and the enclosing unit.
fn build_source(
    factory: &mut SyntaxFactory,
    count: usize,
) -> (Vec<SyntaxNode>, SyntaxNode, String) {
    let mut text = String::new();
    let mut statements = Vec::with_capacity(count);
    for i in 0..count {
        let name = format!("s{i}");
        let comment = format!("// c{i}");
        text.push_str(&format!("{name}(); {comment}\n"));
        let id = factory.token(TokenKind::Identifier, &name, &[], &[]);
        let open = factory.token(TokenKind::OpenParen, "(", &[], &[]);
        let close = factory.token(TokenKind::CloseParen, ")", &[], &[]);
        let semi = factory.token(
            TokenKind::Semicolon,
            ";",
            &[],
            &[
                (TriviaKind::Whitespace, " "),
                (TriviaKind::LineComment, comment.as_str()),
                (TriviaKind::EndOfLine, "\n"),
            ],
        );
        statements.push(SyntaxNode::new(
            NodeKind::ExpressionStatement,
            vec![id.into(), open.into(), close.into(), semi.into()],
        ));
    }
    let unit = SyntaxNode::new(
        NodeKind::CompilationUnit,
        statements.iter().cloned().map(Into::into).collect(),
    );
    (statements, unit, text)
}

fn build_target(factory: &mut SyntaxFactory, name: &str) -> SyntaxNode {
    let id = factory.synthetic(TokenKind::Identifier, name);
    let open = factory.synthetic(TokenKind::OpenParen, "(");
    let close = factory.synthetic_with(
        TokenKind::CloseParen,
        ")",
        TriviaList::new(),
        TriviaList::from_vec(vec![Trivia::end_of_line()]),
    );
    SyntaxNode::new(
        NodeKind::ExpressionStatement,
        vec![id.into(), open.into(), close.into()],
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// For any statement count and any porting order, ported comments
    /// appear in source order and none is lost or duplicated.
    #[test]
    fn ported_comments_preserve_source_order(
        count in 1usize..12,
        seed in any::<u64>(),
    ) {
        let mut factory = SyntaxFactory::new();
        let (statements, unit, text) = build_source(&mut factory, count);
        let mut porter = TriviaPorter::new(&text);

        // Shuffle the porting order deterministically from the seed.
        let mut order: Vec<usize> = (0..count).collect();
        let mut state = seed | 1;
        for i in (1..order.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            #[allow(clippy::cast_possible_truncation)]
            let j = (state % (i as u64 + 1)) as usize;
            order.swap(i, j);
        }

        let mut targets: Vec<Option<SyntaxNode>> = vec![None; count];
        for &index in &order {
            let target = build_target(&mut factory, &format!("s{index}"));
            let ported = porter
                .port_converted_trivia(&statements[index], target)
                .unwrap();
            targets[index] = Some(ported);
        }

        let target_unit = SyntaxNode::new(
            NodeKind::CompilationUnit,
            targets.into_iter().flatten().map(Into::into).collect(),
        );
        let target_unit = porter.port_converted_trivia(&unit, target_unit).unwrap();
        let finished = porter.finish_document(target_unit).unwrap();
        let output = finished.text();

        // Every comment present exactly once, in source order.
        let mut last_pos = 0;
        for i in 0..count {
            let needle = format!("' c{i}");
            let hits: Vec<_> = output.match_indices(&needle).collect();
            // `' c1` is a prefix of `' c10`; count only exact hits
            // (followed by end-of-line).
            let exact: Vec<_> = hits
                .iter()
                .filter(|(pos, _)| {
                    output[pos + needle.len()..].starts_with('\n')
                })
                .collect();
            prop_assert_eq!(exact.len(), 1, "comment {} in: {}", i, output);
            let pos = exact[0].0;
            prop_assert!(pos >= last_pos, "out of order in: {}", output);
            last_pos = pos;
        }
        prop_assert!(porter.is_all_trivia_converted());
    }
}
