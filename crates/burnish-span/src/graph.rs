//! Condensed call-graph data model.
//!
//! The graph is produced by the external extraction tool, one JSON document
//! per compiled unit, with strongly connected components already condensed.
//! This crate only consumes and interprets the condensation; it never
//! computes one.

use std::collections::HashMap;

use camino::Utf8PathBuf;
use serde::Deserialize;

use crate::error::GraphError;
use crate::span::{FileId, Span};

/// Identifier of a function within one condensed graph.
///
/// Function ids index the graph's `elts` table of declaration spans.
pub type FuncId = usize;

/// Identifier of a component (strongly connected set of functions).
///
/// Component ids index the graph's `nodes` table.
pub type NodeId = usize;

/// A call graph condensed into strongly connected components.
///
/// Mutually recursive functions land in one component and must share a
/// single safety verdict: removing a marker from only part of a recursive
/// cycle can never be verified in isolation.
#[derive(Debug, Clone, Deserialize)]
pub struct CondensedCallGraph {
    /// Source file paths, indexed by [`FileId`], relative to the crate root.
    pub files: Vec<Utf8PathBuf>,
    /// Full declaration span per function, indexed by [`FuncId`].
    pub elts: Vec<Span>,
    /// Function ids forming each component, indexed by [`NodeId`].
    pub nodes: Vec<Vec<FuncId>>,
    /// Directed (caller component, callee component) pairs.
    pub edges: Vec<(NodeId, NodeId)>,
}

impl CondensedCallGraph {
    /// Number of functions in the graph.
    #[must_use]
    pub const fn function_count(&self) -> usize {
        self.elts.len()
    }

    /// Number of components in the graph.
    #[must_use]
    pub const fn component_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolves a file id to its path, relative to the crate root.
    #[must_use]
    pub fn file_path(&self, file: FileId) -> Option<&Utf8PathBuf> {
        self.files.get(file.index())
    }

    /// Checks the structural invariants the removal algorithm relies on.
    ///
    /// - every span is non-empty and references a known file;
    /// - `nodes` partitions the function ids: every function id appears in
    ///   exactly one component;
    /// - every edge endpoint is a valid component id.
    ///
    /// # Errors
    ///
    /// Returns the first [`GraphError`] found. Any violation means the
    /// extraction collaborator broke its contract; callers must treat this
    /// as fatal.
    pub fn validate(&self) -> Result<(), GraphError> {
        for span in &self.elts {
            if span.is_empty() {
                return Err(GraphError::empty_span(span.file, span.lo, span.hi));
            }
            if span.file.index() >= self.files.len() {
                return Err(GraphError::unknown_file(span.file, self.files.len()));
            }
        }

        let mut occurrences: HashMap<FuncId, usize> = HashMap::new();
        for members in &self.nodes {
            for &func in members {
                *occurrences.entry(func).or_insert(0) += 1;
            }
        }
        for func in 0..self.function_count() {
            let seen = occurrences.get(&func).copied().unwrap_or(0);
            if seen != 1 {
                return Err(GraphError::BrokenPartition {
                    func,
                    occurrences: seen,
                });
            }
        }
        // A function id beyond the elts table would also break the partition.
        if let Some((&func, &seen)) = occurrences
            .iter()
            .find(|&(&func, _)| func >= self.function_count())
        {
            return Err(GraphError::BrokenPartition {
                func,
                occurrences: seen,
            });
        }

        for &(caller, callee) in &self.edges {
            if caller >= self.component_count() || callee >= self.component_count() {
                return Err(GraphError::UnknownComponent {
                    caller,
                    callee,
                    node_count: self.component_count(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_component_graph() -> CondensedCallGraph {
        CondensedCallGraph {
            files: vec![Utf8PathBuf::from("src/lib.rs")],
            elts: vec![
                Span::new(FileId(0), 0, 10).expect("valid span"),
                Span::new(FileId(0), 20, 30).expect("valid span"),
            ],
            nodes: vec![vec![0], vec![1]],
            edges: vec![(0, 1)],
        }
    }

    #[test]
    fn valid_graph_passes_validation() {
        assert_eq!(two_component_graph().validate(), Ok(()));
    }

    #[test]
    fn duplicated_function_breaks_partition() {
        let mut graph = two_component_graph();
        graph.nodes = vec![vec![0, 1], vec![1]];
        assert!(matches!(
            graph.validate(),
            Err(GraphError::BrokenPartition {
                func: 1,
                occurrences: 2
            })
        ));
    }

    #[test]
    fn missing_function_breaks_partition() {
        let mut graph = two_component_graph();
        graph.nodes = vec![vec![0], vec![]];
        assert!(matches!(
            graph.validate(),
            Err(GraphError::BrokenPartition {
                func: 1,
                occurrences: 0
            })
        ));
    }

    #[test]
    fn edge_to_unknown_component_is_rejected() {
        let mut graph = two_component_graph();
        graph.edges = vec![(0, 7)];
        assert!(matches!(
            graph.validate(),
            Err(GraphError::UnknownComponent { callee: 7, .. })
        ));
    }

    #[test]
    fn span_with_unknown_file_is_rejected() {
        let mut graph = two_component_graph();
        graph.elts[1] = Span {
            file: FileId(3),
            lo: 0,
            hi: 5,
        };
        assert!(matches!(
            graph.validate(),
            Err(GraphError::UnknownFile { .. })
        ));
    }

    #[test]
    fn deserialises_extraction_tool_json() {
        let json = r#"{
            "files": ["src/main.rs"],
            "elts": [{"fileid": 0, "lo": 0, "hi": 12}],
            "nodes": [[0]],
            "edges": []
        }"#;
        let graph: CondensedCallGraph = serde_json::from_str(json).expect("well-formed graph");
        assert_eq!(graph.function_count(), 1);
        assert_eq!(graph.component_count(), 1);
        assert_eq!(graph.validate(), Ok(()));
    }
}
