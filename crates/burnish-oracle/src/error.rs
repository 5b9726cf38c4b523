//! Error types for oracle and external tool invocation.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while invoking external tooling.
///
/// A verification run that *completes* with a failing status is not an
/// error: it is reported as a failed [`crate::Verdict`] and handled by the
/// caller. This enum covers the cases where a tool could not be run or its
/// output could not be used at all.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    /// The external process could not be started.
    #[error("failed to launch {binary}: {source}")]
    Invocation {
        /// The binary that failed to start.
        binary: String,
        /// Underlying error, shared so the enum stays cloneable.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A tool that must succeed exited with a failing status.
    ///
    /// Used for side-effecting commands such as `cargo fmt` where a
    /// failure leaves no verdict to interpret.
    #[error("{binary} {subcommand} exited with status {status:?}: {stderr}")]
    CommandFailed {
        /// The binary that failed.
        binary: String,
        /// Subcommand that was run.
        subcommand: String,
        /// Exit code, when the process terminated normally.
        status: Option<i32>,
        /// Captured standard error, truncated for display.
        stderr: String,
    },

    /// Filesystem failure while handling tool input or output.
    #[error("I/O failure on {path}: {source}")]
    Io {
        /// The affected path.
        path: Utf8PathBuf,
        /// Underlying error, shared so the enum stays cloneable.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// An extraction-tool graph file could not be parsed.
    #[error("malformed call graph in {path}: {message}")]
    MalformedGraph {
        /// The graph file that failed to parse.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

impl OracleError {
    /// Creates an `Invocation` error.
    #[must_use]
    pub fn invocation(binary: impl Into<String>, source: std::io::Error) -> Self {
        Self::Invocation {
            binary: binary.into(),
            source: Arc::new(source),
        }
    }

    /// Creates an `Io` error.
    #[must_use]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}
