//! Command-line driver for the Burnish improvement pipeline.
//!
//! The binary seeds a verified snapshot of a transpiled project, runs the
//! fixed improvement-pass sequence over numbered stage directories, and
//! assembles the surviving tree under `final`. All progress and failure
//! reporting goes through structured tracing; the process exit code is
//! the only other output surface.

use std::ffi::OsString;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use burnish_oracle::{CargoDriver, CargoOracle, Multitool};
use burnish_pipeline::{PassContext, Pipeline, Stage, standard_passes};

mod cli;
pub mod telemetry;

use cli::Cli;
pub use cli::LogFormat;

/// Parses `args` and runs the pipeline, reporting failures via tracing.
pub fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return error.exit(),
    };

    if let Err(error) = telemetry::initialise(cli.log_format, &cli.log_filter) {
        // Telemetry is not up yet, so the clap error surface is all
        // that is available.
        return clap::Error::raw(clap::error::ErrorKind::Io, format!("{error}\n")).exit();
    }

    match execute(&cli) {
        Ok(destination) => {
            info!(destination = %destination, "pipeline complete");
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!(%error, "pipeline aborted");
            ExitCode::FAILURE
        }
    }
}

/// Runs seed-or-resume, the standard passes, and final assembly.
fn execute(cli: &Cli) -> Result<camino::Utf8PathBuf, Box<dyn std::error::Error>> {
    let oracle = CargoOracle::resolve(cli.cargo.as_deref());
    let driver = CargoDriver::new(oracle.binary());
    let multitool = Multitool::new(cli.multitool.clone());
    let context = PassContext {
        oracle: &oracle,
        driver: &driver,
        multitool: &multitool,
    };
    let pipeline = Pipeline::new(context, cli.results.clone(), cli.package.clone());

    let start: Stage = if cli.resume {
        let stage = pipeline.resume()?;
        info!(stage = %stage.directory, "resuming from existing stage");
        stage
    } else {
        let project = cli
            .project
            .as_deref()
            .ok_or("a project tree is required unless resuming")?;
        pipeline.seed(project)?
    };

    let passes = standard_passes();
    let last = pipeline.run(&start, &passes)?;
    info!(stage = %last.directory, "all passes verified");
    Ok(pipeline.assemble_final()?)
}
