//! External multitool collaborator: call-graph extraction and dead-item
//! trimming.
//!
//! The multitool is a compiler-plugin binary maintained outside this
//! repository. Burnish invokes it for two tools and interprets nothing but
//! its exit status and, for extraction, the JSON graph files it writes.

use std::fs;
use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

use burnish_span::CondensedCallGraph;

use crate::error::OracleError;

/// Tool name for condensed call-graph extraction.
const EXTRACT_TOOL: &str = "ExtractCACG";

/// Tool name for dead-item trimming.
const TRIM_DEAD_TOOL: &str = "TrimDeadItems";

/// Handle to the external multitool binary.
#[derive(Debug, Clone)]
pub struct Multitool {
    binary: Utf8PathBuf,
}

impl Multitool {
    /// Creates a handle for the given multitool binary.
    #[must_use]
    pub fn new(binary: impl Into<Utf8PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Path of the multitool binary.
    #[must_use]
    pub fn binary(&self) -> &Utf8Path {
        &self.binary
    }

    /// Extracts the condensed call graphs for a project, one per compiled
    /// unit.
    ///
    /// The tool writes one JSON document per unit into a scratch
    /// directory; each is deserialised into a [`CondensedCallGraph`].
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] when the tool cannot be started, exits with
    /// a failing status, or emits a graph file that does not parse.
    pub fn extract_call_graphs(
        &self,
        project: &Utf8Path,
    ) -> Result<Vec<CondensedCallGraph>, OracleError> {
        let scratch = TempDir::new()
            .map_err(|source| OracleError::io(Utf8PathBuf::from("."), source))?;
        let scratch_path = Utf8Path::from_path(scratch.path())
            .ok_or_else(|| {
                OracleError::io(
                    Utf8PathBuf::from("."),
                    std::io::Error::other("scratch directory path is not UTF-8"),
                )
            })?
            .to_owned();

        self.run_tool(
            project,
            EXTRACT_TOOL,
            &["--cacg-json-outdir", scratch_path.as_str()],
        )?;

        let mut graphs = Vec::new();
        let entries = fs::read_dir(&scratch_path)
            .map_err(|source| OracleError::io(scratch_path.clone(), source))?;
        for entry in entries {
            let entry = entry.map_err(|source| OracleError::io(scratch_path.clone(), source))?;
            let path = Utf8PathBuf::from_path_buf(entry.path()).map_err(|raw| {
                OracleError::io(
                    scratch_path.clone(),
                    std::io::Error::other(format!("non-UTF-8 graph path: {}", raw.display())),
                )
            })?;
            if path.extension() != Some("json") {
                continue;
            }
            let contents =
                fs::read_to_string(&path).map_err(|source| OracleError::io(path.clone(), source))?;
            let graph: CondensedCallGraph =
                serde_json::from_str(&contents).map_err(|err| OracleError::MalformedGraph {
                    path: path.clone(),
                    message: err.to_string(),
                })?;
            graphs.push(graph);
        }

        info!(%project, units = graphs.len(), "extracted condensed call graphs");
        Ok(graphs)
    }

    /// Trims dead items from the project in place.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] when the tool cannot be started or exits
    /// with a failing status.
    pub fn trim_dead_items(&self, project: &Utf8Path) -> Result<(), OracleError> {
        self.run_tool(project, TRIM_DEAD_TOOL, &["--modify-in-place"])
    }

    fn run_tool(
        &self,
        project: &Utf8Path,
        tool: &str,
        extra_args: &[&str],
    ) -> Result<(), OracleError> {
        debug!(%project, binary = %self.binary, tool, "running multitool");
        let output = Command::new(self.binary.as_std_path())
            .arg("--tool")
            .arg(tool)
            .args(extra_args)
            .current_dir(project)
            .output()
            .map_err(|source| OracleError::invocation(self.binary.clone(), source))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(OracleError::CommandFailed {
                binary: self.binary.to_string(),
                subcommand: tool.to_owned(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}
