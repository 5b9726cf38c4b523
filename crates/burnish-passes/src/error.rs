//! Error type for transformation passes.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use burnish_oracle::OracleError;
use burnish_rewrite::RewriteError;
use burnish_span::GraphError;

/// Errors that abort a transformation pass.
///
/// A failed verification is not represented here: the passes recover from
/// it locally by rolling the speculative edit back. These variants cover
/// broken collaborator contracts and operational failures.
#[derive(Debug, Clone, Error)]
pub enum PassError {
    /// The condensed call graph violated its invariants.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A speculative edit could not be applied or rolled back.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    /// The oracle or an external tool could not be invoked.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Filesystem failure outside any edit transaction.
    #[error("I/O failure on {path}: {source}")]
    Io {
        /// The affected path.
        path: Utf8PathBuf,
        /// Underlying error, shared so the enum stays cloneable.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl PassError {
    /// Creates an `Io` error.
    #[must_use]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}
