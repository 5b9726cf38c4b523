//! Span and call-graph data model for the Burnish improvement pipeline.
//!
//! This crate provides the value types the rest of the pipeline is built on:
//!
//! - [`Span`] - an immutable half-open byte range within a named file
//! - [`CondensedCallGraph`] - the strongly-connected-component call graph
//!   produced by the external extraction tool, one per compiled unit
//! - [`locate_marker_span`] - bounded textual search for the `unsafe` marker
//!   within a function declaration span
//!
//! Spans refer to file content as it was when they were computed. The
//! pipeline only ever performs length-preserving edits, so spans for
//! untouched regions of an edited file remain valid.

mod error;
mod graph;
mod marker;
mod span;

pub use error::GraphError;
pub use graph::{CondensedCallGraph, FuncId, NodeId};
pub use marker::{MarkerSpans, locate_marker_span};
pub use span::{FileId, Span};
