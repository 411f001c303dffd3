//! Persistent syntax nodes.
//!
//! A node is a kind plus an ordered child sequence of nodes and tokens
//! behind `Arc`. All edits are functional: `map_tokens` and friends return a
//! new tree, sharing every subtree in which nothing changed. Document order
//! is left-to-right depth-first, which is the order resolution walks rely
//! on.

use std::fmt;
use std::sync::Arc;

use crate::{Span, Token, TokenId, TriviaList};

/// Node kinds the trivia subsystem observes.
///
/// The semantic converters distinguish many more shapes; the trivia
/// subsystem only dispatches on "is this a block construct" and "is this a
/// statement", so the kind set here is the structural minimum both trees
/// share.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    CompilationUnit,
    Block,
    IfStatement,
    WhileStatement,
    ExpressionStatement,
    ReturnStatement,
    LocalDeclaration,
    Expression,
}

impl NodeKind {
    /// A block construct has a header line followed by a delimited body
    /// (`if (…) { … }` in the source, `If … Then … End If` in the target).
    #[inline]
    pub fn is_block_construct(self) -> bool {
        matches!(self, NodeKind::IfStatement | NodeKind::WhileStatement)
    }

    /// Statement-level nodes, including block constructs.
    #[inline]
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            NodeKind::IfStatement
                | NodeKind::WhileStatement
                | NodeKind::ExpressionStatement
                | NodeKind::ReturnStatement
                | NodeKind::LocalDeclaration
        )
    }
}

/// A child of a syntax node.
#[derive(Clone, Eq, PartialEq)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(Token),
}

impl SyntaxElement {
    fn first_token(&self) -> Option<&Token> {
        match self {
            SyntaxElement::Token(t) => Some(t),
            SyntaxElement::Node(n) => n.first_token(),
        }
    }

    fn last_token(&self) -> Option<&Token> {
        match self {
            SyntaxElement::Token(t) => Some(t),
            SyntaxElement::Node(n) => n.last_token(),
        }
    }
}

impl fmt::Debug for SyntaxElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxElement::Node(n) => n.fmt(f),
            SyntaxElement::Token(t) => t.fmt(f),
        }
    }
}

impl From<SyntaxNode> for SyntaxElement {
    fn from(node: SyntaxNode) -> Self {
        SyntaxElement::Node(node)
    }
}

impl From<Token> for SyntaxElement {
    fn from(token: Token) -> Self {
        SyntaxElement::Token(token)
    }
}

/// A persistent syntax tree node.
///
/// Cloning is cheap (one `Arc` bump); edits rebuild only the spine from the
/// changed token to the root.
#[derive(Clone, Eq, PartialEq)]
pub struct SyntaxNode {
    kind: NodeKind,
    children: Arc<[SyntaxElement]>,
}

impl SyntaxNode {
    /// Create a new node from its children.
    pub fn new(kind: NodeKind, children: Vec<SyntaxElement>) -> Self {
        SyntaxNode {
            kind,
            children: children.into(),
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn children(&self) -> &[SyntaxElement] {
        &self.children
    }

    /// The first token in document order.
    pub fn first_token(&self) -> Option<&Token> {
        self.children.iter().find_map(SyntaxElement::first_token)
    }

    /// The last token in document order.
    pub fn last_token(&self) -> Option<&Token> {
        self.children
            .iter()
            .rev()
            .find_map(SyntaxElement::last_token)
    }

    /// All tokens in document order.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        for child in self.children.iter() {
            match child {
                SyntaxElement::Token(t) => out.push(t),
                SyntaxElement::Node(n) => n.collect_tokens(out),
            }
        }
    }

    /// Find a token by id.
    pub fn token_by_id(&self, id: TokenId) -> Option<&Token> {
        self.tokens().into_iter().find(|t| t.id() == id)
    }

    /// Span covering all tokens (ignoring trivia).
    pub fn span(&self) -> Span {
        let mut span: Option<Span> = None;
        for token in self.tokens() {
            if token.span() == Span::DUMMY {
                continue;
            }
            span = Some(match span {
                Some(s) => s.merge(token.span()),
                None => token.span(),
            });
        }
        span.unwrap_or(Span::DUMMY)
    }

    /// Rebuild the tree, replacing each token for which `f` returns a new
    /// value. Tokens are visited in document order. Subtrees in which `f`
    /// returned `None` for every token are shared, not copied.
    #[must_use]
    pub fn map_tokens(&self, f: &mut impl FnMut(&Token) -> Option<Token>) -> SyntaxNode {
        self.map_tokens_inner(f).unwrap_or_else(|| self.clone())
    }

    /// Returns `Some(rebuilt)` when any token under this node changed.
    fn map_tokens_inner(&self, f: &mut impl FnMut(&Token) -> Option<Token>) -> Option<SyntaxNode> {
        let mut new_children: Option<Vec<SyntaxElement>> = None;
        for (index, child) in self.children.iter().enumerate() {
            let replacement = match child {
                SyntaxElement::Token(t) => f(t).map(SyntaxElement::Token),
                SyntaxElement::Node(n) => n.map_tokens_inner(f).map(SyntaxElement::Node),
            };
            if let Some(new_child) = replacement {
                new_children
                    .get_or_insert_with(|| self.children.to_vec())
                    [index] = new_child;
            }
        }
        new_children.map(|children| SyntaxNode {
            kind: self.kind,
            children: children.into(),
        })
    }

    /// New tree with the token carrying `id` replaced.
    ///
    /// A missing id yields the unchanged tree; the callers that tolerate
    /// misses (the porter, the line mapper) treat that as their accepted
    /// no-op.
    #[must_use]
    pub fn replace_token(&self, id: TokenId, replacement: Token) -> SyntaxNode {
        let mut replacement = Some(replacement);
        self.map_tokens(&mut |token| {
            if token.id() == id {
                replacement.take()
            } else {
                None
            }
        })
    }

    /// New tree with the first token's leading run replaced.
    #[must_use]
    pub fn with_leading_trivia(&self, leading: TriviaList) -> SyntaxNode {
        match self.first_token() {
            Some(first) => self.replace_token(first.id(), first.with_leading_trivia(leading)),
            None => self.clone(),
        }
    }

    /// New tree with the last token's trailing run replaced.
    #[must_use]
    pub fn with_trailing_trivia(&self, trailing: TriviaList) -> SyntaxNode {
        match self.last_token() {
            Some(last) => self.replace_token(last.id(), last.with_trailing_trivia(trailing)),
            None => self.clone(),
        }
    }

    /// Full text rendering including trivia.
    pub fn text(&self) -> String {
        self.tokens().into_iter().map(Token::render).collect()
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({} children)", self.kind, self.children.len())
    }
}
