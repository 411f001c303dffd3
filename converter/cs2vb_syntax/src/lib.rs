//! Syntax interface layer for the cs2vb converter.
//!
//! This crate contains the tree and token values the trivia relocation
//! subsystem operates on:
//! - Spans for source locations
//! - Trivia values (whitespace, comments, directives) and trivia runs
//! - Tokens carrying leading/trailing trivia and annotations
//! - Persistent syntax nodes with functional update operations
//! - Line tables for whole-file trivia mapping
//! - The doc-comment XML model
//!
//! # Design Philosophy
//!
//! Every tree and token value is immutable. Edits (`with_leading_trivia`,
//! `replace_token`, …) return new values; unchanged subtrees are shared
//! behind `Arc`. Annotations are stored on the token value itself, so they
//! survive arbitrarily many functional rebuilds of the ancestors — there is
//! no side table keyed by object identity.

mod annotation;
mod doc_xml;
mod factory;
mod line_index;
mod node;
mod span;
mod token;
mod trivia;

pub use annotation::{Annotation, AnnotationKind, Annotations, ConversionId};
pub use doc_xml::{parse_doc_comment, DocXmlAttribute, DocXmlElement, DocXmlError, DocXmlNode};
pub use factory::SyntaxFactory;
pub use line_index::LineIndex;
pub use node::{NodeKind, SyntaxElement, SyntaxNode};
pub use span::Span;
pub use token::{Token, TokenId, TokenKind};
pub use trivia::{DirectiveKind, Trivia, TriviaKind, TriviaList, UnsupportedKind};
