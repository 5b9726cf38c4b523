//! Stage model and numbered-directory naming.
//!
//! Stage numbering is owned by the orchestrator as an explicit ascending
//! counter; directory listing is used only to rediscover stages of an
//! interrupted run and to select the final output, with the parsing
//! contract `^(\d+)_.*$` and ties broken by the greatest numeric value.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::PipelineError;

/// One checkpointed, oracle-verified snapshot of the project tree.
///
/// Stages are created by the orchestrator, never mutated once verified,
/// and never deleted by the pipeline: superseded stages stay on disk for
/// audit and resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Position in the pipeline, starting at 0 for the seed.
    pub sequence: u32,
    /// Tag of the pass that produced this stage.
    pub tag: String,
    /// Directory holding the snapshot.
    pub directory: Utf8PathBuf,
}

impl Stage {
    /// Creates a stage record.
    #[must_use]
    pub fn new(sequence: u32, tag: impl Into<String>, directory: impl Into<Utf8PathBuf>) -> Self {
        Self {
            sequence,
            tag: tag.into(),
            directory: directory.into(),
        }
    }
}

/// Formats the directory name for a stage: zero-padded counter plus tag.
#[must_use]
pub fn stage_dir_name(sequence: u32, tag: &str) -> String {
    format!("{sequence:02}_{tag}")
}

/// Parses a stage directory name into its counter and tag.
///
/// Accepts names matching `^(\d+)_.*$`; anything else returns `None`.
#[must_use]
pub fn parse_stage_name(name: &str) -> Option<(u32, &str)> {
    let (digits, tag) = name.split_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    Some((digits.parse().ok()?, tag))
}

/// Finds the highest-numbered stage directory under `results`, if any.
///
/// Used to resume an interrupted run and to select the tree that becomes
/// the final output; the live pipeline itself tracks its counter
/// explicitly and never consults the directory listing.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] when the results directory cannot be
/// read. A missing directory yields `Ok(None)`.
pub fn discover_latest_stage(results: &Utf8Path) -> Result<Option<Stage>, PipelineError> {
    if !results.exists() {
        return Ok(None);
    }

    let mut latest: Option<Stage> = None;
    let entries =
        fs::read_dir(results).map_err(|source| PipelineError::io(results.to_owned(), source))?;
    for entry in entries {
        let entry = entry.map_err(|source| PipelineError::io(results.to_owned(), source))?;
        let is_dir = entry
            .file_type()
            .map_err(|source| PipelineError::io(results.to_owned(), source))?
            .is_dir();
        if !is_dir {
            continue;
        }
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.path()) else {
            continue;
        };
        let Some(name) = path.file_name() else {
            continue;
        };
        let Some((sequence, tag)) = parse_stage_name(name) else {
            continue;
        };
        let candidate = Stage::new(sequence, tag, path.clone());
        if latest
            .as_ref()
            .is_none_or(|stage| candidate.sequence > stage.sequence)
        {
            latest = Some(candidate);
        }
    }
    Ok(latest)
}
