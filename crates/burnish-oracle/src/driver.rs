//! Plain cargo subcommand driver for side-effecting pipeline steps.

use std::process::Command;

use camino::Utf8Path;
use tracing::debug;

use crate::error::OracleError;

/// Upper bound on stderr retained in error values.
const STDERR_SNIPPET_LEN: usize = 4096;

/// Runs cargo subcommands that must succeed (`fmt`, `fix`, `clean`).
///
/// Unlike the verification oracle, these commands are side-effecting
/// transforms: a failing exit status carries no verdict to interpret and
/// is reported as an error.
#[derive(Debug, Clone)]
pub struct CargoDriver {
    cargo: String,
}

impl CargoDriver {
    /// Creates a driver using the given cargo binary.
    #[must_use]
    pub fn new(cargo: impl Into<String>) -> Self {
        Self {
            cargo: cargo.into(),
        }
    }

    /// Formats the project in place.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] when cargo cannot be started or exits with
    /// a failing status.
    pub fn fmt(&self, project: &Utf8Path) -> Result<(), OracleError> {
        self.run(project, "fmt", &[])
    }

    /// Applies the compiler's machine-applicable fixes in place.
    ///
    /// The stage directories are not version-controlled, hence the
    /// `--allow-no-vcs --allow-dirty` flags.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] when cargo cannot be started or exits with
    /// a failing status.
    pub fn fix(&self, project: &Utf8Path) -> Result<(), OracleError> {
        self.run(project, "fix", &["--allow-no-vcs", "--allow-dirty"])
    }

    /// Removes the named package's build artefacts so the next pass starts
    /// without stale incremental state. Dependency artefacts are kept.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] when cargo cannot be started or exits with
    /// a failing status.
    pub fn clean_package(&self, project: &Utf8Path, package: &str) -> Result<(), OracleError> {
        self.run(project, "clean", &["-p", package])
    }

    fn run(
        &self,
        project: &Utf8Path,
        subcommand: &str,
        extra_args: &[&str],
    ) -> Result<(), OracleError> {
        debug!(%project, cargo = %self.cargo, subcommand, "running cargo subcommand");
        let output = Command::new(&self.cargo)
            .arg(subcommand)
            .args(extra_args)
            .current_dir(project)
            .output()
            .map_err(|source| OracleError::invocation(self.cargo.clone(), source))?;

        if output.status.success() {
            return Ok(());
        }

        let mut stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if stderr.len() > STDERR_SNIPPET_LEN {
            let mut end = STDERR_SNIPPET_LEN;
            while end > 0 && !stderr.is_char_boundary(end) {
                end -= 1;
            }
            stderr.truncate(end);
        }
        Err(OracleError::CommandFailed {
            binary: self.cargo.clone(),
            subcommand: subcommand.to_owned(),
            status: output.status.code(),
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlaunchable_binary_reports_invocation_error() {
        let driver = CargoDriver::new("/nonexistent/burnish-test-cargo");
        assert!(matches!(
            driver.fmt(Utf8Path::new(".")),
            Err(OracleError::Invocation { .. })
        ));
    }

    #[test]
    fn failing_command_reports_subcommand() {
        // `false` starts fine and exits non-zero regardless of arguments.
        let driver = CargoDriver::new("false");
        let result = driver.clean_package(Utf8Path::new("."), "demo");
        match result {
            Err(OracleError::CommandFailed { subcommand, .. }) => {
                assert_eq!(subcommand, "clean");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn succeeding_command_is_ok() {
        // `true` ignores its arguments and exits successfully.
        let driver = CargoDriver::new("true");
        assert!(driver.fmt(Utf8Path::new(".")).is_ok());
    }
}
