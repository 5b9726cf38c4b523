//! Error types for speculative rewriting.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced by edit transactions.
///
/// Verification failures are not errors here: a rejected speculative edit
/// is an expected outcome handled by the caller through `restore`. This
/// enum covers operational failures that prevent a transaction from
/// completing at all.
#[derive(Debug, Clone, Error)]
pub enum RewriteError {
    /// A file could not be read or written.
    #[error("I/O failure on {path}: {source}")]
    Io {
        /// Path to the affected file.
        path: Utf8PathBuf,
        /// Underlying error, shared so the enum stays cloneable.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// An erasure range fell outside the staged content or split a UTF-8
    /// character.
    ///
    /// This indicates a stale span and therefore a broken collaborator
    /// contract; callers must treat it as fatal.
    #[error("erasure range [{lo}..{hi}) invalid for {path} ({len} bytes)")]
    SpanOutOfBounds {
        /// Path to the affected file.
        path: Utf8PathBuf,
        /// Start of the offending range.
        lo: usize,
        /// End of the offending range.
        hi: usize,
        /// Length of the staged content the range was applied to.
        len: usize,
    },

    /// A staged transform changed the content length.
    ///
    /// Length-preserving edits are the contract that keeps every other
    /// span of the file valid.
    #[error("transform changed length of {path}: {before} -> {after} bytes")]
    LengthChanged {
        /// Path to the affected file.
        path: Utf8PathBuf,
        /// Content length before the transform.
        before: usize,
        /// Content length after the transform.
        after: usize,
    },
}

impl RewriteError {
    /// Creates an `Io` error.
    #[must_use]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}
