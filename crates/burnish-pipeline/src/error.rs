//! Error type for pipeline orchestration.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use burnish_oracle::OracleError;
use burnish_passes::PassError;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A transformation pass failed.
    #[error("pass '{tag}' failed: {source}")]
    Pass {
        /// Tag of the failing pass.
        tag: String,
        /// The underlying pass error.
        #[source]
        source: PassError,
    },

    /// The oracle or an external tool could not be invoked.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// A stage's post-transform verification rejected the tree.
    ///
    /// This is fatal at pipeline level: there is no retry, and no later
    /// stage is created. The failing stage directory retains the oracle
    /// output for inspection.
    #[error("stage {sequence:02}_{tag} failed verification; diagnostics kept in {directory}")]
    StageVerificationFailed {
        /// Sequence number of the failing stage.
        sequence: u32,
        /// Tag of the failing stage.
        tag: String,
        /// Directory holding the rejected tree and oracle output.
        directory: Utf8PathBuf,
    },

    /// The seed tree failed its initial verification.
    ///
    /// Improvement passes need a compiling starting point; a broken seed
    /// means the transpiler contract was not met.
    #[error("seed stage at {directory} does not verify")]
    SeedVerificationFailed {
        /// Directory holding the rejected seed tree.
        directory: Utf8PathBuf,
    },

    /// Filesystem failure while snapshotting or assembling output.
    #[error("I/O failure on {path}: {source}")]
    Io {
        /// The affected path.
        path: Utf8PathBuf,
        /// Underlying error, shared so the enum stays cloneable.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// No stage directory was found where one was required.
    #[error("no numbered stage directory found in {directory}")]
    NoStageFound {
        /// The results directory that was searched.
        directory: Utf8PathBuf,
    },
}

impl PipelineError {
    /// Creates an `Io` error.
    #[must_use]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Wraps a pass error with the failing pass's tag.
    #[must_use]
    pub fn pass(tag: impl Into<String>, source: PassError) -> Self {
        Self::Pass {
            tag: tag.into(),
            source,
        }
    }
}
