//! Error types for the span and call-graph model.

use thiserror::Error;

use crate::span::FileId;

/// Errors raised while validating or interpreting a condensed call graph.
///
/// Every variant is a consistency error: the extraction collaborator
/// produced data that violates its contract. These are fatal and never
/// retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    /// A span had an empty or inverted byte range.
    #[error("empty span in {file}: [{lo}..{hi})")]
    EmptySpan {
        /// File the span refers to.
        file: FileId,
        /// Claimed start offset.
        lo: usize,
        /// Claimed end offset.
        hi: usize,
    },

    /// A span referenced a file id outside the graph's file table.
    #[error("span references unknown {file}; graph has {file_count} files")]
    UnknownFile {
        /// The out-of-range file id.
        file: FileId,
        /// Number of files the graph declares.
        file_count: usize,
    },

    /// A function id appeared in zero or multiple components.
    #[error("function {func} appears in {occurrences} components; expected exactly one")]
    BrokenPartition {
        /// The offending function id.
        func: usize,
        /// How many components claim the function.
        occurrences: usize,
    },

    /// An edge referenced a component id outside the graph's node table.
    #[error("edge ({caller}, {callee}) references unknown component; graph has {node_count}")]
    UnknownComponent {
        /// Caller component id of the offending edge.
        caller: usize,
        /// Callee component id of the offending edge.
        callee: usize,
        /// Number of components the graph declares.
        node_count: usize,
    },

    /// The ready-set traversal stalled with components left unfinished.
    ///
    /// A correct condensation leaves no cycles between components, so a
    /// stalled traversal means the collaborator contract was broken.
    #[error("traversal stalled with {remaining} unfinished components")]
    UnresolvedCycle {
        /// Number of components that never became ready.
        remaining: usize,
    },
}

impl GraphError {
    /// Creates an `EmptySpan` error.
    #[must_use]
    pub const fn empty_span(file: FileId, lo: usize, hi: usize) -> Self {
        Self::EmptySpan { file, lo, hi }
    }

    /// Creates an `UnknownFile` error.
    #[must_use]
    pub const fn unknown_file(file: FileId, file_count: usize) -> Self {
        Self::UnknownFile { file, file_count }
    }
}
