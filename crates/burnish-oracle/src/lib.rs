//! Verification oracle and external tool interfaces for Burnish.
//!
//! The pipeline treats the Rust compiler as a black-box oracle: it is
//! invoked on a project tree and consulted only for overall success or
//! failure, the volume of its diagnostic output, and a small closed set of
//! diagnostic classification codes. This crate provides:
//!
//! - [`VerificationOracle`] - the oracle seam, implemented for production
//!   by [`CargoOracle`] (`cargo check --message-format=json`)
//! - [`Verdict`] and [`Diagnostic`] - the closed model over the subset of
//!   cargo's JSON output the pipeline actually consumes; unknown shapes
//!   degrade to ignored diagnostics, never a crash
//! - [`CargoDriver`] - plain cargo subcommands (`fmt`, `fix`, `clean`)
//!   used by the formatting, auto-fix, and cleanup steps
//! - [`Multitool`] - the external call-graph extraction and dead-item
//!   trimming collaborator

mod diagnostic;
mod driver;
mod error;
mod multitool;
mod oracle;
#[cfg(any(test, feature = "test-support"))]
mod test_doubles;

pub use diagnostic::{Diagnostic, DiagnosticClass, DiagnosticLocation, Severity, Verdict};
pub use driver::CargoDriver;
pub use error::OracleError;
pub use multitool::Multitool;
pub use oracle::{CargoOracle, VerificationOracle};
#[cfg(any(test, feature = "test-support"))]
pub use test_doubles::{
    ScriptedOracle, failing_verdict, passing_verdict, passing_verdict_with,
};
