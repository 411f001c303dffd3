//! Line tables.
//!
//! Maps byte offsets to 0-based physical line numbers. Built once per
//! document from the source text; the whole-file line trivia mapper uses it
//! on the source side of a conversion.

use crate::Span;

/// Line-start table for one text.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line. Always begins with 0.
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    /// Build the table from text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(u32::try_from(offset).unwrap_or(u32::MAX).saturating_add(1));
            }
        }
        LineIndex {
            line_starts,
            len: u32::try_from(text.len()).unwrap_or(u32::MAX),
        }
    }

    /// Number of physical lines.
    #[inline]
    pub fn line_count(&self) -> u32 {
        u32::try_from(self.line_starts.len()).unwrap_or(u32::MAX)
    }

    /// The 0-based line containing a byte offset.
    pub fn line_of(&self, offset: u32) -> u32 {
        let idx = self.line_starts.partition_point(|&start| start <= offset);
        u32::try_from(idx.saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// Byte span of a line, excluding its terminating line break.
    pub fn line_span(&self, line: u32) -> Option<Span> {
        let line = line as usize;
        let start = *self.line_starts.get(line)?;
        let end = match self.line_starts.get(line + 1) {
            Some(next) => next.saturating_sub(1),
            None => self.len,
        };
        Some(Span::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_of(0), 0);
        assert_eq!(index.line_of(2), 0); // the newline itself
        assert_eq!(index.line_of(3), 1);
        assert_eq!(index.line_of(6), 2); // empty line
        assert_eq!(index.line_of(8), 3);
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn test_line_span() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.line_span(0), Some(Span::new(0, 2)));
        assert_eq!(index.line_span(1), Some(Span::new(3, 5)));
        assert_eq!(index.line_span(9), None);
    }
}
