//! Explicit ready-set traversal over condensed-graph components.
//!
//! The removal algorithm must finalise a component's callees before the
//! component itself, because the compiler's verdict on a caller can depend
//! on what it is permitted to do inside callee bodies. Readiness is
//! modelled directly: each component counts its distinct unfinished
//! callees, and joins the ready set when that count reaches zero.
//!
//! Components in the ready set at the same time are independent, so their
//! verifications could in principle run concurrently (serialised over the
//! shared build cache). The pipeline keeps them sequential.

use std::collections::{HashSet, VecDeque};

use burnish_span::NodeId;

/// Leaves-first traversal state over component ids.
#[derive(Debug)]
pub struct ReadyTraversal {
    /// Distinct unfinished callees per component.
    blockers: Vec<usize>,
    /// Callers waiting on each component.
    dependents: Vec<Vec<NodeId>>,
    ready: VecDeque<NodeId>,
    finished: usize,
    total: usize,
}

impl ReadyTraversal {
    /// Builds the traversal for `component_count` components and the given
    /// (caller, callee) edges.
    ///
    /// Self-loops and duplicate edges are collapsed; edges must already be
    /// bounds-checked by graph validation.
    #[must_use]
    pub fn new(component_count: usize, edges: &[(NodeId, NodeId)]) -> Self {
        let mut callees: Vec<HashSet<NodeId>> = vec![HashSet::new(); component_count];
        for &(caller, callee) in edges {
            if caller != callee && caller < component_count && callee < component_count {
                let _ = callees
                    .get_mut(caller)
                    .map(|set| set.insert(callee));
            }
        }

        let mut dependents: Vec<Vec<NodeId>> = vec![Vec::new(); component_count];
        let mut blockers = vec![0_usize; component_count];
        for (caller, callee_set) in callees.iter().enumerate() {
            if let Some(count) = blockers.get_mut(caller) {
                *count = callee_set.len();
            }
            for &callee in callee_set {
                if let Some(waiters) = dependents.get_mut(callee) {
                    waiters.push(caller);
                }
            }
        }

        let ready = blockers
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count == 0)
            .map(|(node, _)| node)
            .collect();

        Self {
            blockers,
            dependents,
            ready,
            finished: 0,
            total: component_count,
        }
    }

    /// Takes the next ready component, if any.
    pub fn next_ready(&mut self) -> Option<NodeId> {
        self.ready.pop_front()
    }

    /// Marks a component finalised, releasing callers that were only
    /// waiting on it.
    pub fn finish(&mut self, node: NodeId) {
        self.finished += 1;
        let waiters = self
            .dependents
            .get_mut(node)
            .map(std::mem::take)
            .unwrap_or_default();
        for caller in waiters {
            if let Some(count) = self.blockers.get_mut(caller) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.ready.push_back(caller);
                }
            }
        }
    }

    /// Whether every component has been finalised.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.finished == self.total
    }

    /// Number of components not yet finalised.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.total - self.finished
    }
}
