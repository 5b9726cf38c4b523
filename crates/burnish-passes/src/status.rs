//! Per-function safety status tracking.

use burnish_span::{FuncId, MarkerSpans};

/// What the pipeline knows about a function's need for its `unsafe` marker.
///
/// The transpiler over-approximates: it marks every possibly-unsafe
/// function, because the compiler can neither add nor remove markers on
/// demand. A marked function therefore starts `Unknown`; an unmarked one
/// needs no verification work and starts `Safe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyStatus {
    /// The function verifiably does not need a marker.
    Safe,
    /// The marker was confirmed necessary by a failed verification.
    Unsafe,
    /// Carries a marker whose necessity has not been tested yet.
    Unknown,
}

/// Safety statuses for every function in one condensed graph.
///
/// Statuses commit monotonically: each component is processed exactly once
/// by the traversal, so a status leaves `Unknown` at most once and then
/// never changes for the remainder of the run.
#[derive(Debug, Clone)]
pub struct SafetyLedger(Vec<SafetyStatus>);

impl SafetyLedger {
    /// Initialises the ledger from the located marker spans.
    #[must_use]
    pub fn from_markers(markers: &MarkerSpans) -> Self {
        Self(
            markers
                .iter()
                .map(|span| {
                    if span.is_some() {
                        SafetyStatus::Unknown
                    } else {
                        SafetyStatus::Safe
                    }
                })
                .collect(),
        )
    }

    /// Returns a function's current status.
    ///
    /// Unknown function ids report `Safe`: they carry no marker this run
    /// could remove.
    #[must_use]
    pub fn status(&self, func: FuncId) -> SafetyStatus {
        self.0.get(func).copied().unwrap_or(SafetyStatus::Safe)
    }

    /// Applies one verdict to every member of a component.
    ///
    /// Mutually recursive functions share a verdict by construction; a
    /// member only indirectly implicated (its address taken rather than
    /// called) can be conservatively marked `Unsafe` along with the rest.
    /// That approximation is deliberate.
    pub fn mark_all(&mut self, members: &[FuncId], status: SafetyStatus) {
        for &func in members {
            if let Some(slot) = self.0.get_mut(func) {
                *slot = status;
            }
        }
    }

    /// Number of functions still `Unknown`.
    #[must_use]
    pub fn unknown_count(&self) -> usize {
        self.0
            .iter()
            .filter(|&&status| status == SafetyStatus::Unknown)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_verdict_applies_to_all_members() {
        let mut ledger = SafetyLedger(vec![
            SafetyStatus::Unknown,
            SafetyStatus::Unknown,
            SafetyStatus::Safe,
        ]);
        ledger.mark_all(&[0, 1], SafetyStatus::Unsafe);
        assert_eq!(ledger.status(0), SafetyStatus::Unsafe);
        assert_eq!(ledger.status(1), SafetyStatus::Unsafe);
        assert_eq!(ledger.status(2), SafetyStatus::Safe);
        assert_eq!(ledger.unknown_count(), 0);
    }

    #[test]
    fn unknown_ids_report_safe() {
        let ledger = SafetyLedger(vec![SafetyStatus::Unknown]);
        assert_eq!(ledger.status(17), SafetyStatus::Safe);
    }
}
