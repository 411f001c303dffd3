//! Per-document conversion surface.
//!
//! A [`DocumentConverter`] is the context object the node-conversion
//! visitors thread through one document's conversion. It owns that
//! document's trivia porter (and through it the translator), so all
//! porting state is explicit and per-document — nothing here is global or
//! shared across threads.

use tracing::debug;

use cs2vb_syntax::{SyntaxNode, Trivia};
use cs2vb_trivia::{map_source_trivia_to_target, translate, TriviaError, TriviaPorter};

use crate::ConvertError;

/// Conversion context for a single document.
pub struct DocumentConverter {
    name: String,
    porter: TriviaPorter,
}

impl DocumentConverter {
    /// Create a converter for one document.
    pub fn new(name: impl Into<String>, source_text: &str) -> Self {
        DocumentConverter {
            name: name.into(),
            porter: TriviaPorter::new(source_text),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Port trivia for one conversion step: a visitor converted `source`
    /// into `target` and calls this before wiring `target` into its
    /// parent.
    pub fn port_converted_trivia(
        &mut self,
        source: &SyntaxNode,
        target: SyntaxNode,
    ) -> Result<SyntaxNode, ConvertError> {
        self.porter
            .port_converted_trivia(source, target)
            .map_err(|source| self.wrap(source))
    }

    /// Append a directive's own trailing comment content (the comment
    /// after the directive keyword, if any) to the end of the target's
    /// current last line.
    pub fn with_appended_trailing_trivia_from_end_of_directive_token(
        &mut self,
        directive: &Trivia,
        target: SyntaxNode,
    ) -> Result<SyntaxNode, ConvertError> {
        let run = translate::directive_trailing_run(directive.text());
        if run.is_empty() {
            return Ok(target);
        }
        self.porter
            .append_trailing_run(target, &run)
            .map_err(|source| self.wrap(source))
    }

    /// Enter an expression-granularity context; conditional directives
    /// translated inside render inert.
    pub fn enter_expression_context(&mut self) {
        self.porter.translator_mut().enter_expression_context();
    }

    /// Leave the innermost expression-granularity context.
    pub fn exit_expression_context(&mut self) {
        self.porter.translator_mut().exit_expression_context();
    }

    /// Finish the document: run the outermost deferred resolution, then
    /// the whole-file line trivia pass over the completed target tree.
    ///
    /// Only whole-document conversions call this; snippet conversions stop
    /// at [`Self::port_converted_trivia`].
    pub fn finish(
        &mut self,
        source: &SyntaxNode,
        target: SyntaxNode,
    ) -> Result<SyntaxNode, ConvertError> {
        let target = self
            .porter
            .finish_document(target)
            .map_err(|source| self.wrap(source))?;
        let target = map_source_trivia_to_target(source, target, &mut self.porter)
            .map_err(|source| self.wrap(source))?;
        self.porter.log_missed_annotations();
        if !self.porter.is_all_trivia_converted() {
            debug!(document = %self.name, "document finished with unconverted trailing trivia");
        }
        Ok(target)
    }

    /// Validation hook for tests: true iff no pending delegation still has
    /// substantive trailing trivia.
    pub fn is_all_trivia_converted(&self) -> bool {
        self.porter.is_all_trivia_converted()
    }

    fn wrap(&self, source: TriviaError) -> ConvertError {
        ConvertError::Trivia {
            document: self.name.clone(),
            source,
        }
    }
}
