//! The checkpointed pipeline orchestrator.

use std::fs;
use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use crate::error::PipelineError;
use crate::passes::{PassContext, StagePass};
use crate::snapshot::copy_tree;
use crate::stage::{Stage, discover_latest_stage, stage_dir_name};

/// Directory name the finished tree is assembled under.
pub const FINAL_DIR: &str = "final";

/// Tag given to the verified seed stage.
const SEED_TAG: &str = "out";

/// File a failing stage retains the oracle output in.
const VERIFY_FAILURE_LOG: &str = "burnish-verify-failure.log";

/// Runs the improvement passes over durable, numbered stage snapshots.
///
/// The orchestrator owns the stage counter explicitly; it consults the
/// directory listing only when resuming an interrupted run and when
/// assembling the final output.
pub struct Pipeline<'a> {
    context: PassContext<'a>,
    results: Utf8PathBuf,
    package: String,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline writing stages under `results` for `package`.
    #[must_use]
    pub fn new(
        context: PassContext<'a>,
        results: impl Into<Utf8PathBuf>,
        package: impl Into<String>,
    ) -> Self {
        Self {
            context,
            results: results.into(),
            package: package.into(),
        }
    }

    /// Copies the input tree into stage `00_out` and verifies it.
    ///
    /// Improvement passes need a compiling starting point, so a seed the
    /// oracle rejects aborts the run before any pass is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SeedVerificationFailed`] when the oracle
    /// rejects the copied tree, [`PipelineError::Oracle`] when it cannot
    /// be invoked, and [`PipelineError::Io`] on copy failure.
    pub fn seed(&self, input: &Utf8Path) -> Result<Stage, PipelineError> {
        fs::create_dir_all(&self.results)
            .map_err(|source| PipelineError::io(self.results.clone(), source))?;
        let directory = self.results.join(stage_dir_name(0, SEED_TAG));
        copy_tree(input, &directory)?;

        let verdict = self.context.oracle.verify(&directory)?;
        if !verdict.success {
            retain_failure_log(&directory, &verdict.output)?;
            return Err(PipelineError::SeedVerificationFailed { directory });
        }
        self.context.driver.clean_package(&directory, &self.package)?;
        info!(stage = %directory, "seed stage verified");
        Ok(Stage::new(0, SEED_TAG, directory))
    }

    /// Resumes from the highest-numbered stage already on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoStageFound`] when the results directory
    /// holds no numbered stage, and [`PipelineError::Io`] when it cannot
    /// be read.
    pub fn resume(&self) -> Result<Stage, PipelineError> {
        discover_latest_stage(&self.results)?.ok_or_else(|| PipelineError::NoStageFound {
            directory: self.results.clone(),
        })
    }

    /// Runs `passes` in order, starting from `seed`.
    ///
    /// Each pass gets a fresh copy of the previous stage's tree, is
    /// verified after transforming it, and has its build artefacts for
    /// the target package cleaned before the next pass compiles. The
    /// first verification failure aborts the run with the rejected tree
    /// left on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::StageVerificationFailed`] on the first
    /// rejected stage, [`PipelineError::Pass`] when a transform fails,
    /// and [`PipelineError::Oracle`]/[`PipelineError::Io`] on
    /// invocation or copy failure.
    pub fn run(
        &self,
        seed: &Stage,
        passes: &[Box<dyn StagePass>],
    ) -> Result<Stage, PipelineError> {
        let mut previous = seed.clone();
        for pass in passes {
            previous = self.run_stage(&previous, pass.as_ref())?;
        }
        Ok(previous)
    }

    /// Runs one pass as stage `previous.sequence + 1`.
    fn run_stage(
        &self,
        previous: &Stage,
        pass: &dyn StagePass,
    ) -> Result<Stage, PipelineError> {
        let sequence = previous.sequence + 1;
        let tag = pass.tag();
        let directory = self.results.join(stage_dir_name(sequence, tag));
        copy_tree(&previous.directory, &directory)?;

        let work_started = Instant::now();
        pass.apply(&self.context, &directory)
            .map_err(|source| PipelineError::pass(tag, source))?;
        let verdict = self.context.oracle.verify(&directory)?;
        if !verdict.success {
            retain_failure_log(&directory, &verdict.output)?;
            return Err(PipelineError::StageVerificationFailed {
                sequence,
                tag: tag.to_owned(),
                directory,
            });
        }
        let work_elapsed = work_started.elapsed();

        let cleanup_started = Instant::now();
        self.context.driver.clean_package(&directory, &self.package)?;
        info!(
            stage = %directory,
            work_ms = as_millis(work_elapsed),
            cleanup_ms = as_millis(cleanup_started.elapsed()),
            "stage verified"
        );
        Ok(Stage::new(sequence, tag, directory))
    }

    /// Copies the highest-numbered stage into the `final` directory.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoStageFound`] when no stage exists and
    /// [`PipelineError::Io`] when the copy fails or `final` already
    /// exists.
    pub fn assemble_final(&self) -> Result<Utf8PathBuf, PipelineError> {
        let latest = self.resume()?;
        let destination = self.results.join(FINAL_DIR);
        copy_tree(&latest.directory, &destination)?;
        info!(source = %latest.directory, destination = %destination, "final tree assembled");
        Ok(destination)
    }
}

/// Writes the oracle output into the failing stage directory.
fn retain_failure_log(directory: &Utf8Path, output: &str) -> Result<(), PipelineError> {
    let log = directory.join(VERIFY_FAILURE_LOG);
    fs::write(&log, output).map_err(|source| PipelineError::io(log.clone(), source))?;
    Ok(())
}

/// Millisecond count for tracing fields.
fn as_millis(elapsed: std::time::Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
