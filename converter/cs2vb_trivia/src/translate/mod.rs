//! Trivia translation.
//!
//! Converts one classified trivia value (or an ordered run) from C# form to
//! VB form. Translation is total over every defined [`TriviaKind`]; the one
//! runtime rejection is [`TriviaKind::None`], which surfaces the deliberate
//! fail-fast "unimplemented trivia kind" error instead of silently dropping
//! content.
//!
//! The translator knows nothing about tree position. Its only state is the
//! expression-context directive depth: directives nested inside expression
//! contexts (collection and object initializers) cannot be expressed
//! structurally in the target grammar, so while the depth is non-zero,
//! conditional directives render as inert comments and line breaks flatten
//! to single spaces to keep the surrounding single-line construct valid.

mod comments;
mod directives;
mod doc;

pub use directives::{directive_trailing_run, rewrite_condition, UNSUPPORTED_MARKER};

use cs2vb_syntax::{Trivia, TriviaKind, TriviaList};

use crate::TriviaError;

/// Per-document trivia translator.
///
/// One instance per converted document, owned by that document's porter.
#[derive(Debug, Default)]
pub struct TriviaTranslator {
    /// Nesting count of expression contexts entered by the caller.
    expr_contexts: u32,
    /// Depth of conditional directives opened inside expression contexts.
    directive_depth: u32,
}

impl TriviaTranslator {
    pub fn new() -> Self {
        TriviaTranslator::default()
    }

    /// Enter an expression-granularity context (e.g. an initializer).
    /// Conditional directives translated while inside render inert.
    pub fn enter_expression_context(&mut self) {
        self.expr_contexts += 1;
    }

    /// Leave the innermost expression-granularity context.
    pub fn exit_expression_context(&mut self) {
        self.expr_contexts = self.expr_contexts.saturating_sub(1);
    }

    #[inline]
    pub fn in_expression_context(&self) -> bool {
        self.expr_contexts > 0
    }

    /// Current conditional-directive depth inside expression contexts.
    #[inline]
    pub fn directive_depth(&self) -> u32 {
        self.directive_depth
    }

    /// Translate an ordered trivia run.
    ///
    /// Applies the line-break rule: every emitted comment, doc comment, or
    /// directive is immediately followed by an end-of-line unless the
    /// following trivia already is one. The rule is suspended while the
    /// directive depth is non-zero (the flattened region must stay on one
    /// physical line).
    pub fn translate_run(&mut self, run: &TriviaList) -> Result<TriviaList, TriviaError> {
        let source: Vec<&Trivia> = run.iter().collect();
        let mut out: Vec<Trivia> = Vec::new();
        for (index, &trivia) in source.iter().enumerate() {
            let depth_before = self.directive_depth;
            out.extend(self.translate(trivia)?);
            let in_flattened_region = depth_before > 0 || self.directive_depth > 0;
            let next_is_newline = source
                .get(index + 1)
                .is_some_and(|t| t.kind().is_end_of_line());
            let needs_break =
                matches!(out.last(), Some(t) if t.kind().needs_line_break());
            if needs_break && !next_is_newline && !in_flattened_region {
                out.push(Trivia::end_of_line());
            }
        }
        Ok(TriviaList::from_vec(out))
    }

    /// Translate a single trivia value into its target-form sequence.
    pub fn translate(&mut self, trivia: &Trivia) -> Result<Vec<Trivia>, TriviaError> {
        let translated = match trivia.kind() {
            TriviaKind::Whitespace => {
                vec![Trivia::synthetic(TriviaKind::Whitespace, trivia.text())]
            }
            TriviaKind::EndOfLine => {
                if self.directive_depth > 0 {
                    // Flattened inside a disabled expression-context region.
                    vec![Trivia::space()]
                } else {
                    vec![Trivia::synthetic(TriviaKind::EndOfLine, trivia.text())]
                }
            }
            TriviaKind::LineComment => comments::translate_line_comment(trivia),
            TriviaKind::BlockComment => comments::translate_block_comment(trivia),
            TriviaKind::DocCommentLine | TriviaKind::DocCommentBlock => {
                doc::translate_doc_comment(trivia)
            }
            TriviaKind::DocExterior => {
                vec![Trivia::synthetic(TriviaKind::DocExterior, "'''")]
            }
            TriviaKind::Directive(kind) => directives::translate_directive(self, trivia, kind),
            TriviaKind::None => {
                return Err(TriviaError::UnimplementedKind {
                    kind: trivia.kind(),
                    span: trivia.span(),
                })
            }
        };
        Ok(translated)
    }

    pub(crate) fn raise_directive_depth(&mut self) {
        self.directive_depth += 1;
    }

    pub(crate) fn lower_directive_depth(&mut self) {
        self.directive_depth = self.directive_depth.saturating_sub(1);
    }
}
