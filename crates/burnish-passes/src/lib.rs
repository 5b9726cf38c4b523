//! Compiler-guided transformation passes for the Burnish pipeline.
//!
//! Two passes live here, both built on speculative edits gated by the
//! verification oracle:
//!
//! - [`remove_unsafe_markers`] - walks the condensed call graph leaves
//!   first and erases each component's `unsafe` markers as one atomic
//!   trial, keeping the erasure only when the whole project still checks
//! - [`trim_suppressions`] - whiteouts file-level suppression directives
//!   one candidate phrase at a time, reverting any edit that fails the
//!   check or inflates the diagnostic volume beyond the pass baseline

mod error;
mod ready;
mod status;
mod trim;
mod unsafe_removal;

pub use error::PassError;
pub use ready::ReadyTraversal;
pub use status::{SafetyLedger, SafetyStatus};
pub use trim::{CANDIDATE_TRIMS, TrimReport, trim_suppressions};
pub use unsafe_removal::{RemovalReport, remove_unsafe_markers};
