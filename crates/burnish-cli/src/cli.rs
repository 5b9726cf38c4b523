//! CLI argument definitions for the Burnish pipeline driver.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Log output format selection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// Compact single-line output for interactive use.
    #[default]
    Compact,
    /// Flattened JSON events for log collection.
    Json,
}

/// Command-line interface for the Burnish improvement pipeline.
#[derive(Parser, Debug)]
#[command(name = "burnish", version, about = "Verification-gated improvement passes for transpiled Rust")]
pub(crate) struct Cli {
    /// Project tree to seed the pipeline from.
    #[arg(long, value_name = "DIR", required_unless_present = "resume")]
    pub(crate) project: Option<Utf8PathBuf>,

    /// Directory the numbered stage snapshots are written under.
    #[arg(long, value_name = "DIR", default_value = "results")]
    pub(crate) results: Utf8PathBuf,

    /// Name of the cargo package whose build artefacts are cleaned
    /// between stages.
    #[arg(long, value_name = "NAME")]
    pub(crate) package: String,

    /// Path to the analysis multitool binary.
    #[arg(long, value_name = "PATH")]
    pub(crate) multitool: Utf8PathBuf,

    /// Overrides the cargo binary used for verification and driving.
    #[arg(long, value_name = "PATH")]
    pub(crate) cargo: Option<String>,

    /// Continues from the highest-numbered stage already on disk
    /// instead of seeding a fresh run.
    #[arg(long)]
    pub(crate) resume: bool,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,

    /// Log filter expression in `tracing` env-filter syntax.
    #[arg(long, value_name = "FILTER", default_value = "info")]
    pub(crate) log_filter: String,
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_a_full_invocation() {
        let cli = Cli::try_parse_from([
            "burnish",
            "--project",
            "build/out",
            "--results",
            "build/results",
            "--package",
            "transpiled",
            "--multitool",
            "/opt/multitool",
            "--log-format",
            "json",
        ])
        .expect("arguments parse");
        assert_eq!(cli.project.as_deref().map(|p| p.as_str()), Some("build/out"));
        assert_eq!(cli.results.as_str(), "build/results");
        assert_eq!(cli.package, "transpiled");
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(!cli.resume);
    }

    #[test]
    fn resume_does_not_need_a_project() {
        let cli = Cli::try_parse_from([
            "burnish",
            "--resume",
            "--package",
            "transpiled",
            "--multitool",
            "/opt/multitool",
        ])
        .expect("arguments parse");
        assert!(cli.resume);
        assert_eq!(cli.project, None);
    }

    #[rstest]
    #[case::missing_package(vec!["burnish", "--project", "p", "--multitool", "m"])]
    #[case::missing_project(vec!["burnish", "--package", "p", "--multitool", "m"])]
    fn rejects_incomplete_invocations(#[case] args: Vec<&str>) {
        let error = Cli::try_parse_from(args).expect_err("arguments rejected");
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }
}
