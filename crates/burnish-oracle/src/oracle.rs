//! The verification oracle seam and its cargo-backed implementation.

use std::env;
use std::process::Command;

use camino::Utf8Path;
use tracing::{debug, info};

use crate::diagnostic::{Verdict, parse_stream};
use crate::error::OracleError;

/// Environment variable overriding the cargo binary used by the pipeline.
pub const CARGO_ENV_VAR: &str = "BURNISH_CARGO";

/// The verification oracle: checks a project tree and reports a verdict.
///
/// The oracle is consulted purely for pass/fail, diagnostic volume, and
/// classification codes; its internals are never introspected. Running the
/// oracle twice against an unmodified tree must yield the same outcome.
pub trait VerificationOracle {
    /// Checks the project tree at `project` and reports the verdict.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Invocation`] when the oracle process cannot
    /// be started at all. A completed run that rejects the tree is a
    /// failed [`Verdict`], not an error.
    fn verify(&self, project: &Utf8Path) -> Result<Verdict, OracleError>;
}

/// Production oracle: `cargo check --message-format=json`.
#[derive(Debug, Clone)]
pub struct CargoOracle {
    cargo: String,
}

impl CargoOracle {
    /// Creates an oracle using the given cargo binary.
    #[must_use]
    pub fn new(cargo: impl Into<String>) -> Self {
        Self {
            cargo: cargo.into(),
        }
    }

    /// Creates an oracle from an optional override, falling back to the
    /// `BURNISH_CARGO` environment variable and then to `cargo`.
    #[must_use]
    pub fn resolve(binary_override: Option<&str>) -> Self {
        let cargo = binary_override
            .map(ToOwned::to_owned)
            .or_else(|| env::var(CARGO_ENV_VAR).ok())
            .unwrap_or_else(|| String::from("cargo"));
        Self { cargo }
    }

    /// The cargo binary this oracle invokes.
    #[must_use]
    pub fn binary(&self) -> &str {
        &self.cargo
    }
}

impl VerificationOracle for CargoOracle {
    fn verify(&self, project: &Utf8Path) -> Result<Verdict, OracleError> {
        debug!(%project, cargo = %self.cargo, "running verification oracle");
        let output = Command::new(&self.cargo)
            .args(["check", "--message-format=json"])
            .current_dir(project)
            .output()
            .map_err(|source| OracleError::invocation(self.cargo.clone(), source))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let diagnostics = parse_stream(&stdout);
        let verdict = Verdict {
            success: output.status.success(),
            output: stdout,
            diagnostics,
        };
        info!(
            %project,
            success = verdict.success,
            diagnostics = verdict.diagnostics.len(),
            volume = verdict.output_volume(),
            "oracle verdict"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_explicit_override() {
        let oracle = CargoOracle::resolve(Some("/toolchains/cargo"));
        assert_eq!(oracle.binary(), "/toolchains/cargo");
    }

    #[test]
    fn resolve_falls_back_to_default() {
        // BURNISH_CARGO may be set in the environment; accept either.
        let oracle = CargoOracle::resolve(None);
        if let Ok(from_env) = env::var(CARGO_ENV_VAR) {
            assert_eq!(oracle.binary(), from_env);
        } else {
            assert_eq!(oracle.binary(), "cargo");
        }
    }

    #[test]
    fn unlaunchable_oracle_reports_invocation_error() {
        let oracle = CargoOracle::new("/nonexistent/burnish-test-cargo");
        let result = oracle.verify(Utf8Path::new("."));
        assert!(matches!(result, Err(OracleError::Invocation { .. })));
    }
}
