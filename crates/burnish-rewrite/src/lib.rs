//! Speculative edit transactions for the Burnish improvement pipeline.
//!
//! A speculative edit is a trial mutation applied to disk and kept only if
//! the verification oracle accepts the resulting state. This crate provides
//! the two transaction shapes the pipeline uses:
//!
//! - [`EditTransaction`] - a single-file transaction that captures the
//!   original content at open time, stages composable transforms, flushes
//!   to disk only when content actually changed, and closes through a
//!   consuming [`EditTransaction::commit`] or [`EditTransaction::restore`]
//! - [`SpanEraser`] - a multi-file transaction that whiteouts a batch of
//!   spans across files and rolls every touched file back together
//!
//! All erasures are length-preserving: a span's text is replaced by an
//! equal number of fill bytes, so previously computed spans for other
//! regions of the same file remain valid.

mod eraser;
mod error;
mod transaction;

pub use eraser::SpanEraser;
pub use error::RewriteError;
pub use transaction::EditTransaction;
