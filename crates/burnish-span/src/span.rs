//! Byte-range value types.

use serde::Deserialize;

use crate::error::GraphError;

/// Index of a file within a [`crate::CondensedCallGraph`]'s file table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub usize);

impl FileId {
    /// Returns the underlying file-table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// A half-open byte range `[lo, hi)` within one file's original content.
///
/// The range is interpreted against the file content at the time the span
/// was computed. Length-preserving edits keep all other spans of the same
/// file valid; any length-changing edit would invalidate them, so the
/// pipeline never performs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct Span {
    /// File the range refers to, as an index into the graph's file table.
    #[serde(rename = "fileid")]
    pub file: FileId,
    /// Inclusive start offset in bytes.
    pub lo: usize,
    /// Exclusive end offset in bytes.
    pub hi: usize,
}

impl Span {
    /// Creates a span, enforcing the `hi > lo` invariant.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptySpan`] when the range would be empty or
    /// inverted; such a span indicates a broken extraction-tool contract.
    pub fn new(file: FileId, lo: usize, hi: usize) -> Result<Self, GraphError> {
        if hi > lo {
            Ok(Self { file, lo, hi })
        } else {
            Err(GraphError::empty_span(file, lo, hi))
        }
    }

    /// Length of the range in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.hi - self.lo
    }

    /// Returns false; spans are non-empty by construction.
    ///
    /// Present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.hi <= self.lo
    }

    /// Returns the text this span covers within `contents`, or `None` when
    /// the span falls outside the file or splits a UTF-8 character.
    #[must_use]
    pub fn slice<'a>(&self, contents: &'a str) -> Option<&'a str> {
        contents.get(self.lo..self.hi)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}..{})", self.file, self.lo, self.hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_enforces_non_empty_range() {
        assert!(Span::new(FileId(0), 3, 9).is_ok());
        assert!(Span::new(FileId(0), 9, 9).is_err());
        assert!(Span::new(FileId(0), 9, 3).is_err());
    }

    #[test]
    fn slice_returns_covered_text() {
        let span = Span::new(FileId(0), 7, 13).expect("valid span");
        assert_eq!(span.slice("pub fn unsafe_fn()"), Some("unsafe"));
        assert_eq!(span.len(), 6);
    }

    #[test]
    fn slice_rejects_out_of_bounds_ranges() {
        let span = Span::new(FileId(0), 2, 40).expect("valid span");
        assert_eq!(span.slice("short"), None);
    }
}
