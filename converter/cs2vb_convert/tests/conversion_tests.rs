//! Whole-document conversion scenarios.
//!
//! The node-conversion visitors are external to this workspace; these
//! tests play their role by hand — building the source tree, building the
//! corresponding target subtrees bottom-up, and calling the trivia surface
//! the way a visitor would.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use cs2vb_convert::{convert_documents, ConvertError, ConvertOptions, DocumentConverter, DocumentJob};
use cs2vb_syntax::{
    DirectiveKind, NodeKind, SyntaxFactory, SyntaxNode, TokenKind, Trivia, TriviaKind, TriviaList,
};

fn eol_list() -> TriviaList {
    TriviaList::from_vec(vec![Trivia::end_of_line()])
}

/// Source:
/// ```text
/// #region "Foo"
/// /// <summary>Greets.</summary>
/// greet(); // call
/// #endregion
/// ```
struct RegionDoc {
    source_text: String,
    statement: SyntaxNode,
    unit: SyntaxNode,
}

fn build_region_doc(factory: &mut SyntaxFactory) -> RegionDoc {
    let source_text = "#region \"Foo\"\n/// <summary>Greets.</summary>\ngreet(); // call\n#endregion\n".to_owned();

    let greet = factory.token(
        TokenKind::Identifier,
        "greet",
        &[
            (TriviaKind::Directive(DirectiveKind::Region), "#region \"Foo\""),
            (TriviaKind::EndOfLine, "\n"),
            (
                TriviaKind::DocCommentLine,
                "/// <summary>Greets.</summary>",
            ),
            (TriviaKind::EndOfLine, "\n"),
        ],
        &[],
    );
    let open = factory.token(TokenKind::OpenParen, "(", &[], &[]);
    let close = factory.token(TokenKind::CloseParen, ")", &[], &[]);
    let semi = factory.token(
        TokenKind::Semicolon,
        ";",
        &[],
        &[
            (TriviaKind::Whitespace, " "),
            (TriviaKind::LineComment, "// call"),
            (TriviaKind::EndOfLine, "\n"),
        ],
    );
    let statement = SyntaxNode::new(
        NodeKind::ExpressionStatement,
        vec![greet.into(), open.into(), close.into(), semi.into()],
    );
    let eof = factory.token(
        TokenKind::Eof,
        "",
        &[
            (TriviaKind::Directive(DirectiveKind::EndRegion), "#endregion"),
            (TriviaKind::EndOfLine, "\n"),
        ],
        &[],
    );
    let unit = SyntaxNode::new(
        NodeKind::CompilationUnit,
        vec![statement.clone().into(), eof.into()],
    );
    RegionDoc {
        source_text,
        statement,
        unit,
    }
}

#[test]
fn test_whole_document_with_regions_doc_comment_and_trailing_comment() {
    let mut factory = SyntaxFactory::new();
    let doc = build_region_doc(&mut factory);
    let mut converter = DocumentConverter::new("greeter.cs", &doc.source_text);

    // Statement converts first.
    let vb_greet = factory.synthetic(TokenKind::Identifier, "greet");
    let vb_open = factory.synthetic(TokenKind::OpenParen, "(");
    let vb_close = factory.synthetic_with(
        TokenKind::CloseParen,
        ")",
        TriviaList::new(),
        eol_list(),
    );
    let vb_statement = SyntaxNode::new(
        NodeKind::ExpressionStatement,
        vec![vb_greet.into(), vb_open.into(), vb_close.into()],
    );
    let vb_statement = converter
        .port_converted_trivia(&doc.statement, vb_statement)
        .unwrap();

    // Then the compilation unit wraps it.
    let vb_eof = factory.synthetic(TokenKind::Eof, "");
    let vb_unit = SyntaxNode::new(
        NodeKind::CompilationUnit,
        vec![vb_statement.into(), vb_eof.into()],
    );
    let vb_unit = converter.port_converted_trivia(&doc.unit, vb_unit).unwrap();
    let finished = converter.finish(&doc.unit, vb_unit).unwrap();

    assert_eq!(
        finished.text(),
        "#Region \"Foo\"\n''' <summary>Greets.</summary>\ngreet() ' call\n#End Region\n"
    );
    assert!(converter.is_all_trivia_converted());
}

#[test]
fn test_unimplemented_trivia_kind_fails_the_document() {
    let mut factory = SyntaxFactory::new();
    let token = factory.token(
        TokenKind::Identifier,
        "x",
        &[(TriviaKind::None, "???")],
        &[(TriviaKind::EndOfLine, "\n")],
    );
    let statement = SyntaxNode::new(NodeKind::ExpressionStatement, vec![token.into()]);

    let mut converter = DocumentConverter::new("bad.cs", "???x\n");
    let target = SyntaxNode::new(
        NodeKind::ExpressionStatement,
        vec![factory.synthetic(TokenKind::Identifier, "x").into()],
    );
    let result = converter.port_converted_trivia(&statement, target);
    match result {
        Err(ConvertError::Trivia { document, .. }) => assert_eq!(document, "bad.cs"),
        other => panic!("expected trivia error, got {other:?}"),
    }
}

#[test]
fn test_directive_trailing_helper() {
    let mut factory = SyntaxFactory::new();
    let mut converter = DocumentConverter::new("dir.cs", "#if DEBUG // dbg\n");

    let directive = Trivia::synthetic(
        TriviaKind::Directive(DirectiveKind::If),
        "#if DEBUG // dbg",
    );
    let target = SyntaxNode::new(
        NodeKind::ExpressionStatement,
        vec![factory
            .synthetic_with(TokenKind::Identifier, "x", TriviaList::new(), eol_list())
            .into()],
    );
    let target = converter
        .with_appended_trailing_trivia_from_end_of_directive_token(&directive, target)
        .unwrap();
    assert_eq!(target.text(), "x ' dbg\n");
}

#[test]
fn test_pipeline_converts_documents_independently() {
    let jobs = vec![
        DocumentJob::new("a.cs", "a(); // one\n"),
        DocumentJob::new("b.cs", "b(); // two\n"),
    ];
    let options = ConvertOptions {
        threads: 2,
        cancel: None,
    };
    let results = convert_documents(&jobs, &options, |converter, job| {
        let mut factory = SyntaxFactory::new();
        let name = job.name.trim_end_matches(".cs");
        let id = factory.token(TokenKind::Identifier, name, &[], &[]);
        let open = factory.token(TokenKind::OpenParen, "(", &[], &[]);
        let close = factory.token(TokenKind::CloseParen, ")", &[], &[]);
        let comment = format!(
            "// {}",
            if name == "a" { "one" } else { "two" }
        );
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
        let statement = SyntaxNode::new(
            NodeKind::ExpressionStatement,
            vec![id.into(), open.into(), close.into(), semi.into()],
        );
        let unit = SyntaxNode::new(NodeKind::CompilationUnit, vec![statement.clone().into()]);

        let vb = SyntaxNode::new(
            NodeKind::ExpressionStatement,
            vec![
                factory.synthetic(TokenKind::Identifier, name).into(),
                factory.synthetic(TokenKind::OpenParen, "(").into(),
                factory
                    .synthetic_with(TokenKind::CloseParen, ")", TriviaList::new(), eol_list())
                    .into(),
            ],
        );
        let vb = converter.port_converted_trivia(&statement, vb)?;
        let vb_unit = SyntaxNode::new(NodeKind::CompilationUnit, vec![vb.into()]);
        let vb_unit = converter.port_converted_trivia(&unit, vb_unit)?;
        let finished = converter.finish(&unit, vb_unit)?;
        Ok(finished.text())
    });

    let texts: Vec<_> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(texts, vec!["a() ' one\n", "b() ' two\n"]);
}
