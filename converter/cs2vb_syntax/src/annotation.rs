//! Token annotations.
//!
//! An annotation is a data tag riding on a token value. Because tokens are
//! immutable and annotations live on the value itself, an annotation is
//! still findable after every functional rebuild of the token's ancestors;
//! no identity-keyed side table is involved.
//!
//! Two kinds exist:
//! - [`Annotation::TrailingPort`] — the deferred porter's "port the recorded
//!   source token's trailing trivia here once the destination is final" tag.
//! - [`Annotation::SourceLines`] — the source line range a target token was
//!   produced from, consumed by the whole-file line mapper.

use std::fmt;

use smallvec::SmallVec;

/// Opaque key linking a deferred target-tree annotation back to the source
/// token whose trailing trivia it represents.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ConversionId(u64);

impl ConversionId {
    /// Create an id from a raw counter value. Ids are issued per document by
    /// the porter; they carry no meaning beyond identity.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        ConversionId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ConversionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conv#{}", self.0)
    }
}

/// Discriminant for query-by-kind lookups.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AnnotationKind {
    TrailingPort,
    SourceLines,
}

/// A tag attachable to a target token. Purely a carrier; it has no behavior.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Annotation {
    /// Deferred trailing-trivia destination marker.
    TrailingPort(ConversionId),
    /// Source physical line range this token was converted from (0-based).
    SourceLines { first: u32, last: u32 },
}

impl Annotation {
    #[inline]
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::TrailingPort(_) => AnnotationKind::TrailingPort,
            Annotation::SourceLines { .. } => AnnotationKind::SourceLines,
        }
    }
}

/// The annotation set carried by a token.
///
/// A token may carry several `TrailingPort` annotations (distinct source
/// tokens can defer onto the same tentative destination) but at most one
/// `SourceLines` annotation; re-stamping merges line ranges.
#[derive(Clone, Eq, PartialEq, Default)]
pub struct Annotations {
    annotations: SmallVec<[Annotation; 1]>,
}

impl Annotations {
    #[inline]
    pub fn new() -> Self {
        Annotations {
            annotations: SmallVec::new(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.annotations.iter()
    }

    /// All annotations of a given kind, in attachment order.
    pub fn of_kind(&self, kind: AnnotationKind) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.kind() == kind)
    }

    /// All trailing-port ids, in attachment order.
    pub fn port_ids(&self) -> impl Iterator<Item = ConversionId> + '_ {
        self.annotations.iter().filter_map(|a| match a {
            Annotation::TrailingPort(id) => Some(*id),
            Annotation::SourceLines { .. } => None,
        })
    }

    /// The source line range, if stamped.
    pub fn source_lines(&self) -> Option<(u32, u32)> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::SourceLines { first, last } => Some((*first, *last)),
            Annotation::TrailingPort(_) => None,
        })
    }

    /// New set with a trailing-port annotation appended.
    #[must_use]
    pub fn with_port(&self, id: ConversionId) -> Annotations {
        let mut annotations = self.annotations.clone();
        annotations.push(Annotation::TrailingPort(id));
        Annotations { annotations }
    }

    /// New set with a specific trailing-port annotation removed.
    #[must_use]
    pub fn without_port(&self, id: ConversionId) -> Annotations {
        let annotations = self
            .annotations
            .iter()
            .filter(|a| !matches!(a, Annotation::TrailingPort(p) if *p == id))
            .copied()
            .collect();
        Annotations { annotations }
    }

    /// New set with the source line range stamped, merging with any
    /// existing stamp (earliest first line, latest last line).
    #[must_use]
    pub fn with_source_lines(&self, first: u32, last: u32) -> Annotations {
        let mut annotations = self.annotations.clone();
        if let Some(existing) = annotations.iter_mut().find_map(|a| match a {
            Annotation::SourceLines { .. } => Some(a),
            Annotation::TrailingPort(_) => None,
        }) {
            if let Annotation::SourceLines {
                first: old_first,
                last: old_last,
            } = existing
            {
                *old_first = (*old_first).min(first);
                *old_last = (*old_last).max(last);
            }
        } else {
            annotations.push(Annotation::SourceLines { first, last });
        }
        Annotations { annotations }
    }
}

impl fmt::Debug for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.annotations.iter()).finish()
    }
}
