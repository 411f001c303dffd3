//! Conversion errors.

use std::fmt;

use cs2vb_trivia::TriviaError;

/// Error converting a document.
///
/// A document either converts with best-effort trivia fidelity or fails
/// outright with the unconvertible trivia kind and its location; there is
/// no partial output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConvertError {
    /// Trivia conversion failed for the named document.
    Trivia {
        document: String,
        source: TriviaError,
    },
    /// The pipeline's cancellation flag was set before this document
    /// started converting.
    Cancelled { document: String },
}

impl ConvertError {
    /// The document the error belongs to.
    pub fn document(&self) -> &str {
        match self {
            ConvertError::Trivia { document, .. } | ConvertError::Cancelled { document } => {
                document
            }
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Trivia { document, source } => {
                write!(f, "converting {document}: {source}")
            }
            ConvertError::Cancelled { document } => {
                write!(f, "conversion of {document} cancelled")
            }
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Trivia { source, .. } => Some(source),
            ConvertError::Cancelled { .. } => None,
        }
    }
}
