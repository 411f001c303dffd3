//! Conversion surface for the cs2vb converter.
//!
//! Two layers:
//! - [`DocumentConverter`]: the per-document context object the node
//!   visitors call trivia porting through, plus the whole-document finish
//!   step (deferred resolution + line mapping).
//! - [`convert_documents`]: the multi-document pipeline — a bounded worker
//!   pool where every worker owns its own converter and cancellation is
//!   checked only between documents.

mod document;
mod error;
mod pipeline;

pub use document::DocumentConverter;
pub use error::ConvertError;
pub use pipeline::{convert_documents, ConvertOptions, DocumentJob};
