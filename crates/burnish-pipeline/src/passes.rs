//! The fixed improvement-pass list and its collaborator context.
//!
//! Pass ordering is load-bearing: the compiler auto-fix must run directly
//! after unsafe-marker removal and before any reformatting, because a
//! block freshly made safe is only removable by `cargo fix` while it still
//! has its un-reformatted shape.

use camino::Utf8Path;
use tracing::info;

use burnish_oracle::{CargoDriver, Multitool, VerificationOracle};
use burnish_passes::{PassError, remove_unsafe_markers, trim_suppressions};

/// External collaborators shared by every pass.
pub struct PassContext<'a> {
    /// The verification oracle gating every stage and speculative edit.
    pub oracle: &'a dyn VerificationOracle,
    /// Driver for plain cargo subcommands.
    pub driver: &'a CargoDriver,
    /// The call-graph extraction and dead-item trimming collaborator.
    pub multitool: &'a Multitool,
}

/// One named transformation applied to a stage directory in place.
pub trait StagePass {
    /// Short tag naming the pass in stage directories and logs.
    fn tag(&self) -> &'static str;

    /// Transforms the stage directory in place.
    ///
    /// # Errors
    ///
    /// Returns [`PassError`] when the transform cannot complete; the
    /// orchestrator treats this as fatal to the run.
    fn apply(&self, context: &PassContext<'_>, stage_dir: &Utf8Path) -> Result<(), PassError>;
}

/// `cargo fmt` over the stage tree.
struct FmtPass;

impl StagePass for FmtPass {
    fn tag(&self) -> &'static str {
        "fmt"
    }

    fn apply(&self, context: &PassContext<'_>, stage_dir: &Utf8Path) -> Result<(), PassError> {
        context.driver.fmt(stage_dir)?;
        Ok(())
    }
}

/// `cargo fix` over the stage tree.
struct FixPass;

impl StagePass for FixPass {
    fn tag(&self) -> &'static str {
        "fix"
    }

    fn apply(&self, context: &PassContext<'_>, stage_dir: &Utf8Path) -> Result<(), PassError> {
        context.driver.fix(stage_dir)?;
        Ok(())
    }
}

/// Dead-item trimming, delegated to the external multitool.
struct TrimDeadPass;

impl StagePass for TrimDeadPass {
    fn tag(&self) -> &'static str {
        "trimdead"
    }

    fn apply(&self, context: &PassContext<'_>, stage_dir: &Utf8Path) -> Result<(), PassError> {
        context.multitool.trim_dead_items(stage_dir)?;
        Ok(())
    }
}

/// Topological unsafe-marker removal over every compiled unit.
struct UnsafeRemovalPass;

impl StagePass for UnsafeRemovalPass {
    fn tag(&self) -> &'static str {
        "ununsafe"
    }

    fn apply(&self, context: &PassContext<'_>, stage_dir: &Utf8Path) -> Result<(), PassError> {
        let graphs = context.multitool.extract_call_graphs(stage_dir)?;
        for graph in &graphs {
            let report = remove_unsafe_markers(stage_dir, graph, context.oracle)?;
            info!(
                removed = report.markers_removed,
                kept = report.markers_kept,
                "compiled unit processed"
            );
        }
        Ok(())
    }
}

/// Suppression-directive trimming.
struct TrimAllowsPass;

impl StagePass for TrimAllowsPass {
    fn tag(&self) -> &'static str {
        "trim-allows"
    }

    fn apply(&self, context: &PassContext<'_>, stage_dir: &Utf8Path) -> Result<(), PassError> {
        let _ = trim_suppressions(stage_dir, context.oracle)?;
        Ok(())
    }
}

/// The standard improvement sequence, in its required order.
#[must_use]
pub fn standard_passes() -> Vec<Box<dyn StagePass>> {
    vec![
        Box::new(FmtPass),
        Box::new(FixPass),
        Box::new(TrimDeadPass),
        Box::new(UnsafeRemovalPass),
        // Auto-fix again straight after marker removal, before `fmt`.
        Box::new(FixPass),
        Box::new(TrimAllowsPass),
        Box::new(FmtPass),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_sequence_has_the_required_order() {
        let tags: Vec<&str> = standard_passes().iter().map(|pass| pass.tag()).collect();
        assert_eq!(
            tags,
            vec![
                "fmt",
                "fix",
                "trimdead",
                "ununsafe",
                "fix",
                "trim-allows",
                "fmt"
            ]
        );
        // The auto-fix step directly follows marker removal.
        let ununsafe = tags
            .iter()
            .position(|&tag| tag == "ununsafe")
            .expect("ununsafe present");
        assert_eq!(tags.get(ununsafe + 1), Some(&"fix"));
    }
}
