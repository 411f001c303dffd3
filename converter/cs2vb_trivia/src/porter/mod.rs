//! Deferred trailing-trivia porting.
//!
//! Bottom-up conversion builds target subtrees before their ancestors
//! exist, so the final destination token for a source token's trailing
//! trivia is often unknown at the moment the trivia is encountered. The
//! porter solves this with an annotate-now/resolve-later protocol:
//!
//! - **defer** — record the source token under a fresh [`ConversionId`] and
//!   tag the tentative destination token with a port annotation;
//! - **supersede** — when an ancestor discovers a later destination for the
//!   same source token, issue a fresh id and tag the new token; the old
//!   annotation becomes obsolete and is skipped wherever it turns up;
//! - **resolve** — once the trailing position is properly scoped, walk the
//!   annotated tokens in document order, translate, attach, and delete the
//!   record.
//!
//! Annotations ride on token values, so they survive every functional
//! rebuild between defer and resolve. A lookup that misses (the annotated
//! token was re-parented out of reach by a transformation the porter does
//! not track) is a logged no-op, not an error — that loss is an accepted
//! limitation, and the whole-file line mapper catches most of it.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use cs2vb_syntax::{
    ConversionId, LineIndex, NodeKind, Span, SyntaxNode, Token, TokenId, TriviaList,
};

use crate::translate::TriviaTranslator;
use crate::TriviaError;

/// The single source of truth for which source token's trailing trivia a
/// conversion id stands for.
#[derive(Clone, Debug)]
pub struct ConversionRecord {
    pub id: ConversionId,
    pub source_token: Token,
}

/// Per-document deferred trailing-trivia porter.
///
/// Owns the document's translator and all porting state. Never shared
/// across documents or threads; the pipeline creates one per document.
pub struct TriviaPorter {
    translator: TriviaTranslator,
    source_lines: LineIndex,
    /// Conversion-record table, keyed by id.
    records: FxHashMap<ConversionId, ConversionRecord>,
    /// Latest-delegation map: the one live id per source token.
    latest: FxHashMap<TokenId, ConversionId>,
    /// Source tokens whose trailing trivia has been ported.
    trailing_resolved: FxHashSet<TokenId>,
    /// Source tokens whose leading trivia has been ported.
    leading_ported: FxHashSet<TokenId>,
    next_id: u64,
}

impl TriviaPorter {
    /// Create a porter for one document.
    pub fn new(source_text: &str) -> Self {
        TriviaPorter {
            translator: TriviaTranslator::new(),
            source_lines: LineIndex::new(source_text),
            records: FxHashMap::default(),
            latest: FxHashMap::default(),
            trailing_resolved: FxHashSet::default(),
            leading_ported: FxHashSet::default(),
            next_id: 0,
        }
    }

    /// The document's translator (for expression-context tracking and for
    /// the line mapper).
    pub fn translator_mut(&mut self) -> &mut TriviaTranslator {
        &mut self.translator
    }

    /// Line table of the source document.
    pub fn source_line_index(&self) -> &LineIndex {
        &self.source_lines
    }

    /// Whether a source token's trailing trivia has already been ported.
    pub fn was_trailing_resolved(&self, source: TokenId) -> bool {
        self.trailing_resolved.contains(&source)
    }

    /// Whether a source token's leading trivia has already been ported.
    pub fn was_leading_ported(&self, source: TokenId) -> bool {
        self.leading_ported.contains(&source)
    }

    /// Number of live (pending) delegations. Test hook.
    pub fn pending_count(&self) -> usize {
        self.latest.len()
    }

    /// Validation hook: true iff no live delegation's source token still
    /// has substantive trailing trivia. Not evaluated during normal
    /// conversion; the test suite uses it as a hard invariant check.
    pub fn is_all_trivia_converted(&self) -> bool {
        self.latest.values().all(|id| match self.records.get(id) {
            Some(record) => !record.source_token.trailing().has_substantive(),
            None => true,
        })
    }

    /// Port trivia for one conversion step: the visitor converted
    /// `source` into `target` and hands both over before wiring `target`
    /// into its parent.
    ///
    /// Leading trivia of the source's first token is ported directly (the
    /// destination is already known: the target's first token). Trailing
    /// trivia of the source's last token is deferred via annotation, since
    /// an ancestor may yet wrap this subtree. Statement- and block-level
    /// nodes then resolve every annotation that is properly scoped inside
    /// them.
    pub fn port_converted_trivia(
        &mut self,
        source: &SyntaxNode,
        target: SyntaxNode,
    ) -> Result<SyntaxNode, TriviaError> {
        let mut target = self.stamp_source_lines(source, target);
        target = self.port_leading(source, target)?;
        target = self.defer_trailing(source, target);

        let exclude = source.last_token().map(Token::id);
        if source.kind().is_block_construct() {
            target = self.redirect_header_annotations(target);
            target = self.resolve_annotations(target, exclude)?;
        } else if source.kind().is_statement() {
            target = self.resolve_annotations(target, exclude)?;
        } else if source.kind() == NodeKind::CompilationUnit {
            // End-of-file trivia (a closing `#endregion`, final comments)
            // lives in the leading run of the source's last token and has
            // no other porting path.
            target = self.port_end_of_file_leading(source, target)?;
        }
        Ok(target)
    }

    /// Outermost resolution, run once when the whole target tree exists.
    /// Everything still pending — including the root's own trailing
    /// position — resolves here.
    pub fn finish_document(&mut self, target: SyntaxNode) -> Result<SyntaxNode, TriviaError> {
        self.resolve_annotations(target, None)
    }

    /// Translate a trailing run and append it to a target token at the end
    /// of its current physical line. Used by the directive-trailing helper.
    pub fn append_trailing_run(
        &mut self,
        target: SyntaxNode,
        run: &TriviaList,
    ) -> Result<SyntaxNode, TriviaError> {
        let translated = self.translator.translate_run(run)?;
        let Some(last) = target.last_token() else {
            return Ok(target);
        };
        let (last_id, updated) = (last.id(), last.with_trailing_at_line_end(&translated));
        Ok(target.replace_token(last_id, updated))
    }

    /// Log delegations whose annotation was never found in any resolved
    /// tree. Called once after the final resolution pass; the content is
    /// lost, which is the accepted best-effort behavior — a missed lookup
    /// is never an error.
    pub fn log_missed_annotations(&self) {
        for (source, id) in &self.latest {
            let still_substantive = self
                .records
                .get(id)
                .is_some_and(|r| r.source_token.trailing().has_substantive());
            if still_substantive {
                debug!(?id, source = ?source, "annotation not found; trailing trivia lost");
            }
        }
    }

    /// Drop the live delegation for a source token because another
    /// mechanism (the line mapper) placed its trailing trivia.
    pub(crate) fn clear_delegation(&mut self, source: TokenId) {
        if let Some(id) = self.latest.remove(&source) {
            self.records.remove(&id);
        }
        self.trailing_resolved.insert(source);
    }

    pub(crate) fn mark_leading_ported(&mut self, source: TokenId) {
        self.leading_ported.insert(source);
    }

    fn fresh_id(&mut self) -> ConversionId {
        let id = ConversionId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Stamp the source line range onto the target's first and last
    /// tokens. The whole-file line mapper builds its tables from these.
    fn stamp_source_lines(&self, source: &SyntaxNode, target: SyntaxNode) -> SyntaxNode {
        let span = source.span();
        if span == Span::DUMMY {
            return target;
        }
        let first_line = self.source_lines.line_of(span.start);
        let last_line = self
            .source_lines
            .line_of(span.end.saturating_sub(1).max(span.start));

        let first_id = match target.first_token() {
            Some(t) => t.id(),
            None => return target,
        };
        let last_id = match target.last_token() {
            Some(t) => t.id(),
            None => return target,
        };
        target.map_tokens(&mut |token| {
            let mut updated: Option<Token> = None;
            if token.id() == first_id {
                updated = Some(token.with_source_lines(first_line, first_line));
            }
            if token.id() == last_id {
                let base = updated.as_ref().unwrap_or(token);
                updated = Some(base.with_source_lines(last_line, last_line));
            }
            updated
        })
    }

    /// Port the source first token's leading run directly onto the target
    /// first token. The destination is already final: nothing a later
    /// ancestor builds can come before this subtree's first token within
    /// the subtree itself, and ancestors skip re-porting via the
    /// `leading_ported` set.
    fn port_leading(
        &mut self,
        source: &SyntaxNode,
        target: SyntaxNode,
    ) -> Result<SyntaxNode, TriviaError> {
        let Some(source_first) = source.first_token() else {
            return Ok(target);
        };
        if !source_first.leading().has_substantive()
            || self.leading_ported.contains(&source_first.id())
        {
            return Ok(target);
        }
        let run = self.translator.translate_run(source_first.leading())?;
        let Some(target_first) = target.first_token() else {
            return Ok(target);
        };
        let (first_id, updated) = (target_first.id(), target_first.with_prepended_leading(&run));
        self.leading_ported.insert(source_first.id());
        trace!(source = ?source_first.id(), dest = ?first_id, "ported leading trivia");
        Ok(target.replace_token(first_id, updated))
    }

    /// Port the source last token's leading run (end-of-file trivia) onto
    /// the target's last token.
    fn port_end_of_file_leading(
        &mut self,
        source: &SyntaxNode,
        target: SyntaxNode,
    ) -> Result<SyntaxNode, TriviaError> {
        let Some(source_last) = source.last_token() else {
            return Ok(target);
        };
        if !source_last.leading().has_substantive()
            || self.leading_ported.contains(&source_last.id())
        {
            return Ok(target);
        }
        let run = self.translator.translate_run(source_last.leading())?;
        let Some(target_last) = target.last_token() else {
            return Ok(target);
        };
        let (last_id, updated) = (target_last.id(), target_last.with_prepended_leading(&run));
        self.leading_ported.insert(source_last.id());
        trace!(source = ?source_last.id(), dest = ?last_id, "ported end-of-file trivia");
        Ok(target.replace_token(last_id, updated))
    }

    /// Defer (or supersede) the source last token's trailing run.
    fn defer_trailing(&mut self, source: &SyntaxNode, target: SyntaxNode) -> SyntaxNode {
        let Some(source_last) = source.last_token() else {
            return target;
        };
        if !source_last.trailing().has_substantive()
            || self.trailing_resolved.contains(&source_last.id())
        {
            return target;
        }

        // For a block construct whose source sits entirely on its header
        // line (a single-line conditional becoming a multi-line block), the
        // trailing trivia logically belongs to the header: annotate the
        // end-of-header-line token, not the end of the assembled block.
        let destination = if source.kind().is_block_construct() && self.on_one_source_line(source)
        {
            header_end_token(&target).or_else(|| target.last_token())
        } else {
            target.last_token()
        };
        let Some(destination) = destination else {
            return target;
        };

        let id = self.fresh_id();
        let superseded = self.latest.insert(source_last.id(), id);
        trace!(
            ?id,
            source = ?source_last.id(),
            dest = ?destination.id(),
            superseded = superseded.is_some(),
            "deferred trailing trivia"
        );
        self.records.insert(
            id,
            ConversionRecord {
                id,
                source_token: source_last.clone(),
            },
        );
        let (dest_id, annotated) = (destination.id(), destination.with_port_annotation(id));
        target.replace_token(dest_id, annotated)
    }

    fn on_one_source_line(&self, source: &SyntaxNode) -> bool {
        let span = source.span();
        if span == Span::DUMMY {
            return false;
        }
        self.source_lines.line_of(span.start)
            == self
                .source_lines
                .line_of(span.end.saturating_sub(1).max(span.start))
    }

    /// Consolidate still-pending annotations sitting on tokens before the
    /// end of the block's header line onto the end-of-header-line token, so
    /// header trivia lands immediately before the block body.
    fn redirect_header_annotations(&mut self, target: SyntaxNode) -> SyntaxNode {
        let Some(header_end_id) = header_end_token(&target).map(Token::id) else {
            return target;
        };

        let mut moved: Vec<ConversionId> = Vec::new();
        for token in target.tokens() {
            if token.id() == header_end_id {
                break;
            }
            for id in token.annotations().port_ids() {
                if self.is_live(id) {
                    moved.push(id);
                }
            }
        }
        if moved.is_empty() {
            return target;
        }
        trace!(count = moved.len(), dest = ?header_end_id, "redirected header annotations");

        let moved_set: FxHashSet<ConversionId> = moved.iter().copied().collect();
        let mut before_header = true;
        target.map_tokens(&mut |token| {
            if token.id() == header_end_id {
                before_header = false;
                let mut updated = token.clone();
                for id in &moved {
                    updated = updated.with_port_annotation(*id);
                }
                return Some(updated);
            }
            if !before_header {
                return None;
            }
            let carried: Vec<ConversionId> = token
                .annotations()
                .port_ids()
                .filter(|id| moved_set.contains(id))
                .collect();
            if carried.is_empty() {
                return None;
            }
            let mut updated = token.clone();
            for id in carried {
                updated = updated.without_port_annotation(id);
            }
            Some(updated)
        })
    }

    fn is_live(&self, id: ConversionId) -> bool {
        match self.records.get(&id) {
            Some(record) => self.latest.get(&record.source_token.id()) == Some(&id),
            None => false,
        }
    }

    /// Walk annotated tokens in document order and port every live
    /// delegation except the one for `exclude` (the current source node's
    /// own last token, which an ancestor may yet supersede). Stale and
    /// obsolete annotations encountered on the way are dropped.
    fn resolve_annotations(
        &mut self,
        target: SyntaxNode,
        exclude: Option<TokenId>,
    ) -> Result<SyntaxNode, TriviaError> {
        struct Plan {
            strip: Vec<ConversionId>,
            attach: Vec<(ConversionId, TriviaList)>,
        }

        let mut plans: FxHashMap<TokenId, Plan> = FxHashMap::default();
        let mut drop_records: Vec<ConversionId> = Vec::new();
        let mut ported: Vec<(ConversionId, TokenId)> = Vec::new();

        for token in target.tokens() {
            for id in token.annotations().port_ids() {
                let Some(record) = self.records.get(&id) else {
                    trace!(?id, "stale annotation dropped");
                    plans
                        .entry(token.id())
                        .or_insert_with(|| Plan {
                            strip: Vec::new(),
                            attach: Vec::new(),
                        })
                        .strip
                        .push(id);
                    continue;
                };
                let source_id = record.source_token.id();
                if self.latest.get(&source_id) != Some(&id) {
                    trace!(?id, source = ?source_id, "obsolete annotation dropped");
                    drop_records.push(id);
                    plans
                        .entry(token.id())
                        .or_insert_with(|| Plan {
                            strip: Vec::new(),
                            attach: Vec::new(),
                        })
                        .strip
                        .push(id);
                    continue;
                }
                if exclude == Some(source_id) {
                    continue;
                }
                let run = self.translator.translate_run(record.source_token.trailing())?;
                ported.push((id, source_id));
                plans
                    .entry(token.id())
                    .or_insert_with(|| Plan {
                        strip: Vec::new(),
                        attach: Vec::new(),
                    })
                    .attach
                    .push((id, run));
            }
        }

        for id in drop_records {
            self.records.remove(&id);
        }
        for (id, source_id) in ported {
            self.records.remove(&id);
            self.latest.remove(&source_id);
            self.trailing_resolved.insert(source_id);
            trace!(?id, source = ?source_id, "resolved trailing trivia");
        }

        if plans.is_empty() {
            return Ok(target);
        }
        Ok(target.map_tokens(&mut |token| {
            let plan = plans.get(&token.id())?;
            let mut updated = token.clone();
            for id in &plan.strip {
                updated = updated.without_port_annotation(*id);
            }
            for (id, run) in &plan.attach {
                updated = updated
                    .with_trailing_at_line_end(run)
                    .without_port_annotation(*id);
            }
            Some(updated)
        }))
    }
}

impl std::fmt::Debug for TriviaPorter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriviaPorter")
            .field("pending", &self.latest.len())
            .field("resolved", &self.trailing_resolved.len())
            .finish()
    }
}

/// The token ending the first physical line of an assembled block target:
/// the last token before the first line break, or the opening brace's
/// predecessor when the target emitted a brace delimiter.
fn header_end_token(target: &SyntaxNode) -> Option<&Token> {
    let mut previous: Option<&Token> = None;
    for token in target.tokens() {
        if token.kind().is_brace_delimiter() && token.kind().is_block_open() {
            return previous.or(Some(token));
        }
        if token.trailing().iter().any(|t| t.kind().is_end_of_line()) {
            return Some(token);
        }
        previous = Some(token);
    }
    None
}
