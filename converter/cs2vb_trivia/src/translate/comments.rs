//! Plain comment translation.
//!
//! Line comments swap the marker; block comments have no target equivalent
//! and are split into one line comment per physical line.

use cs2vb_syntax::{Trivia, TriviaKind};

/// `// body` → `' body`.
///
/// A body that itself starts with a further `/` is a documentation-style
/// comment that was classified as a plain line comment; it normalizes to
/// the target documentation marker instead.
pub(crate) fn translate_line_comment(trivia: &Trivia) -> Vec<Trivia> {
    let body = trivia.body();
    if let Some(doc_body) = body.strip_prefix('/') {
        return vec![Trivia::synthetic(
            TriviaKind::DocCommentLine,
            format!("'''{doc_body}"),
        )];
    }
    vec![Trivia::line_comment(comment_text(body))]
}

/// `/* … */` → one `'` comment per physical line.
///
/// The opening marker is stripped from the first line and the closing
/// marker from the last; continuation lines lose a leading run of
/// spaces-then-asterisks (the common aligned block-comment style). Interior
/// line breaks are emitted between the comments; the final line break is
/// the run-level rule's job, so a lone-line comment also ends up followed
/// by one.
pub(crate) fn translate_block_comment(trivia: &Trivia) -> Vec<Trivia> {
    let body = trivia.body();
    let mut out = Vec::new();
    for (index, line) in body.split('\n').enumerate() {
        let line = if index == 0 {
            line
        } else {
            strip_continuation_prefix(line)
        };
        if index > 0 {
            out.push(Trivia::end_of_line());
        }
        out.push(Trivia::line_comment(comment_text(line.trim_end())));
    }
    out
}

/// Build target line-comment text from a body, inserting the conventional
/// space between marker and content when the body does not bring its own.
pub(crate) fn comment_text(body: &str) -> String {
    if body.is_empty() || body.starts_with([' ', '\t']) {
        format!("'{body}")
    } else {
        format!("' {body}")
    }
}

/// Strip `[spaces]*[asterisks]` from a block-comment continuation line.
/// Lines not written in the aligned style are kept as-is.
fn strip_continuation_prefix(line: &str) -> &str {
    let stripped = line.trim_start_matches([' ', '\t']);
    if stripped.starts_with('*') {
        stripped.trim_start_matches('*')
    } else {
        line
    }
}
