//! Trivia translation and relocation for the cs2vb converter.
//!
//! Converting C# to Visual Basic preserves every comment, documentation
//! block, and preprocessor directive — but the two grammars have no 1:1
//! node correspondence, so trivia cannot be copied token-for-token. This
//! crate is that relocation machinery, in three layers:
//!
//! - [`translate`]: pure per-kind translation of trivia content
//!   (`// hello` → `' hello`, `#region` → `#Region`, doc-XML re-walking).
//! - [`porter`]: the deferred trailing-trivia porter — an
//!   annotate-now/resolve-later protocol over the persistent target tree,
//!   for trivia whose final destination token is unknown until ancestor
//!   nodes are assembled.
//! - [`line_mapper`]: a single whole-file pass that maps any trivia the
//!   porter did not resolve by source physical line number.
//!
//! Everything is single-threaded and per-document: one
//! [`porter::TriviaPorter`] per converted document, never shared.

pub mod line_mapper;
pub mod porter;
pub mod translate;

mod error;

pub use error::TriviaError;
pub use line_mapper::map_source_trivia_to_target;
pub use porter::{ConversionRecord, TriviaPorter};
pub use translate::{TriviaTranslator, UNSUPPORTED_MARKER};
