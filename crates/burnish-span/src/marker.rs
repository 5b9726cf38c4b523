//! Textual location of `unsafe` markers within function declarations.
//!
//! The extraction tool reports full declaration spans; the removal pass
//! needs the byte range of the `unsafe` keyword itself. The search is
//! bounded and fails closed: it only claims a marker exists when there is
//! direct textual evidence, and it never looks past the `fn` introducer.

use tracing::warn;

use crate::error::GraphError;
use crate::graph::CondensedCallGraph;
use crate::span::Span;

/// The marker keyword whose necessity the pipeline verifies.
pub const MARKER: &str = "unsafe";

/// The function introducer keyword that bounds the marker search.
const INTRODUCER: &str = " fn ";

/// Locates the `unsafe` marker within one declaration span, if present.
///
/// The scan covers the declaration snippet up to and including the `fn`
/// introducer. A declaration that begins directly with `fn` cannot carry a
/// marker. A declaration where the introducer cannot be found at all is a
/// tooling anomaly: it is logged and conservatively treated as having no
/// marker.
///
/// # Errors
///
/// Returns [`GraphError::EmptySpan`] when the declaration span does not
/// resolve to text within `contents`; that indicates a stale or corrupt
/// span from the extraction tool.
pub fn locate_marker_span(contents: &str, decl: Span) -> Result<Option<Span>, GraphError> {
    let snippet = decl
        .slice(contents)
        .ok_or(GraphError::empty_span(decl.file, decl.lo, decl.hi))?;

    if snippet.starts_with("fn") || snippet.starts_with("\nfn") {
        // The declaration opens with the introducer, so no marker fits.
        return Ok(None);
    }

    let Some(introducer_idx) = snippet.find(INTRODUCER) else {
        warn!(
            span = %decl,
            snippet_len = snippet.len(),
            "no fn introducer found in declaration span; assuming no marker"
        );
        return Ok(None);
    };

    // Search only the prefix up to and including the space before `fn`.
    let Some(prefix) = snippet.get(..=introducer_idx) else {
        return Ok(None);
    };
    let Some(marker_idx) = prefix.find("unsafe ") else {
        return Ok(None);
    };

    let lo = decl.lo + marker_idx;
    Ok(Some(Span::new(decl.file, lo, lo + MARKER.len())?))
}

/// Marker spans located per function, parallel to a graph's `elts` table.
#[derive(Debug, Clone)]
pub struct MarkerSpans(Vec<Option<Span>>);

impl MarkerSpans {
    /// Locates marker spans for every function in the graph.
    ///
    /// `file_contents` must parallel the graph's file table: entry `i`
    /// holds the current content of `graph.files[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] when a declaration span references an unknown
    /// file or falls outside that file's content.
    pub fn locate(
        graph: &CondensedCallGraph,
        file_contents: &[String],
    ) -> Result<Self, GraphError> {
        let mut spans = Vec::with_capacity(graph.function_count());
        for decl in &graph.elts {
            let contents = file_contents
                .get(decl.file.index())
                .ok_or(GraphError::unknown_file(decl.file, file_contents.len()))?;
            spans.push(locate_marker_span(contents, *decl)?);
        }
        Ok(Self(spans))
    }

    /// Returns the marker span for a function, if it has one.
    #[must_use]
    pub fn get(&self, func: usize) -> Option<Span> {
        self.0.get(func).copied().flatten()
    }

    /// Number of functions covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no functions are covered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the per-function marker spans.
    pub fn iter(&self) -> impl Iterator<Item = Option<Span>> + '_ {
        self.0.iter().copied()
    }
}
