//! Topological, oracle-verified removal of `unsafe` markers.
//!
//! The condensed call graph is walked leaves first. For each component with
//! untested markers, the markers of all `Unknown` members are whited out as
//! one atomic multi-file trial and the whole project is re-checked. A
//! failing check confirms the markers necessary and rolls every file back;
//! a passing check commits the erasure and additionally cleans up any
//! inner markers the compiler now reports as redundant.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

use burnish_oracle::{DiagnosticClass, DiagnosticLocation, Verdict, VerificationOracle};
use burnish_rewrite::{EditTransaction, RewriteError, SpanEraser};
use burnish_span::{CondensedCallGraph, FuncId, GraphError, MarkerSpans, NodeId, Span};

use crate::error::PassError;
use crate::ready::ReadyTraversal;
use crate::status::{SafetyLedger, SafetyStatus};

/// Summary of one removal run over a single condensed graph.
#[derive(Debug)]
pub struct RemovalReport {
    /// Final safety status per function.
    pub ledger: SafetyLedger,
    /// Components visited by the traversal.
    pub components: usize,
    /// Oracle invocations performed.
    pub oracle_calls: usize,
    /// Markers erased and kept erased.
    pub markers_removed: usize,
    /// Markers confirmed necessary and restored.
    pub markers_kept: usize,
    /// Inner markers cleaned up from redundancy diagnostics.
    pub secondary_cleanups: usize,
}

/// Removes unnecessary `unsafe` markers from the project, guided by the
/// condensed call graph and the verification oracle.
///
/// # Errors
///
/// Returns [`PassError`] when the graph violates its invariants (including
/// a cycle the condensation failed to resolve), when a file cannot be read
/// or written, or when the oracle cannot be invoked. A failed verification
/// is not an error; it finalises the component as `Unsafe`.
pub fn remove_unsafe_markers(
    project: &Utf8Path,
    graph: &CondensedCallGraph,
    oracle: &dyn VerificationOracle,
) -> Result<RemovalReport, PassError> {
    graph.validate()?;

    let file_contents = read_graph_files(project, graph)?;
    let markers = MarkerSpans::locate(graph, &file_contents)?;
    let mut report = RemovalReport {
        ledger: SafetyLedger::from_markers(&markers),
        components: 0,
        oracle_calls: 0,
        markers_removed: 0,
        markers_kept: 0,
        secondary_cleanups: 0,
    };

    let mut traversal = ReadyTraversal::new(graph.component_count(), &graph.edges);
    while let Some(node) = traversal.next_ready() {
        process_component(project, graph, node, &markers, oracle, &mut report)?;
        traversal.finish(node);
        report.components += 1;
    }

    if !traversal.is_complete() {
        return Err(GraphError::UnresolvedCycle {
            remaining: traversal.remaining(),
        }
        .into());
    }

    info!(
        %project,
        components = report.components,
        removed = report.markers_removed,
        kept = report.markers_kept,
        cleanups = report.secondary_cleanups,
        "unsafe-marker removal finished"
    );
    Ok(report)
}

fn read_graph_files(
    project: &Utf8Path,
    graph: &CondensedCallGraph,
) -> Result<Vec<String>, PassError> {
    graph
        .files
        .iter()
        .map(|relative| {
            let path = project.join(relative);
            fs::read_to_string(&path).map_err(|source| PassError::io(path, source))
        })
        .collect()
}

/// Tests one component's markers as a single atomic trial.
///
/// All `Unknown` members must be erased and verified together: mutually
/// recursive functions share a verdict, and a half-applied state would
/// leave spans of the same files invalid relative to each other.
fn process_component(
    project: &Utf8Path,
    graph: &CondensedCallGraph,
    node: NodeId,
    markers: &MarkerSpans,
    oracle: &dyn VerificationOracle,
    report: &mut RemovalReport,
) -> Result<(), PassError> {
    let Some(members) = graph.nodes.get(node) else {
        return Err(GraphError::UnknownComponent {
            caller: node,
            callee: node,
            node_count: graph.component_count(),
        }
        .into());
    };

    let spans: Vec<Span> = members
        .iter()
        .copied()
        .filter(|&func| report.ledger.status(func) == SafetyStatus::Unknown)
        .filter_map(|func: FuncId| markers.get(func))
        .collect();
    if spans.is_empty() {
        // Nothing untested in this component; no oracle call needed.
        return Ok(());
    }

    debug!(node, markers = spans.len(), "trialling marker erasure");
    let mut eraser = SpanEraser::open(&spans, |file| {
        // File ids are validated against the file table up front.
        project.join(&graph.files[file.index()])
    })?;
    let _ = eraser.flush_all()?;

    let verdict = oracle.verify(project)?;
    report.oracle_calls += 1;

    if verdict.success {
        eraser.commit_all()?;
        report.ledger.mark_all(members, SafetyStatus::Safe);
        report.markers_removed += spans.len();
        report.secondary_cleanups += cleanup_redundant_markers(project, &verdict);
    } else {
        debug!(node, "verification rejected erasure; markers are necessary");
        eraser.restore_all()?;
        report.ledger.mark_all(members, SafetyStatus::Unsafe);
        report.markers_kept += spans.len();
    }
    Ok(())
}

/// Whiteouts inner markers the compiler reported as redundant after a
/// successful erasure.
///
/// Neither `cargo fix` nor clippy removes these, so the pass does. This is
/// best-effort secondary cleanup: individual failures are logged and
/// skipped, never fatal.
fn cleanup_redundant_markers(project: &Utf8Path, verdict: &Verdict) -> usize {
    let mut cleaned = 0;
    for diagnostic in verdict.diagnostics_of_class(DiagnosticClass::RedundantMarker) {
        let Some(location) = diagnostic.primary_location() else {
            continue;
        };
        match whiteout_location(project, location) {
            Ok(()) => cleaned += 1,
            Err(error) => {
                warn!(file = %location.file, %error, "skipping redundant-marker cleanup");
            }
        }
    }
    cleaned
}

fn whiteout_location(
    project: &Utf8Path,
    location: &DiagnosticLocation,
) -> Result<(), RewriteError> {
    let path: Utf8PathBuf = project.join(&location.file);
    let mut tx = EditTransaction::open(path)?;
    tx.stage_erase(location.byte_start, location.byte_end)?;
    tx.commit()
}
