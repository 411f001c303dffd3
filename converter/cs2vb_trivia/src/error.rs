//! Trivia conversion errors.
//!
//! The taxonomy is deliberately small:
//! - an unimplemented trivia kind is fatal for the file and always surfaced;
//! - a structured doc-comment visit failure is recovered locally (the
//!   offending content degrades to raw text) and only reaches callers when
//!   recovery itself is impossible;
//! - a missed annotation is not an error at all — it is the porter's
//!   accepted silent no-op, logged but never thrown.

use std::fmt;

use cs2vb_syntax::{Span, TriviaKind};

/// Error converting trivia.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TriviaError {
    /// A trivia kind reached the translator that it has no rule for.
    ///
    /// Silently dropping unrecognized content is worse than a loud failure
    /// for the file, so this is surfaced as a hard conversion error.
    UnimplementedKind { kind: TriviaKind, span: Span },
    /// Structured doc-comment content could not be visited and raw-text
    /// recovery was not possible.
    DocVisit { reason: String, span: Span },
}

impl fmt::Display for TriviaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriviaError::UnimplementedKind { kind, span } => {
                write!(f, "unimplemented trivia kind {kind:?} at {span}")
            }
            TriviaError::DocVisit { reason, span } => {
                write!(f, "failed to visit doc comment content at {span}: {reason}")
            }
        }
    }
}

impl std::error::Error for TriviaError {}
