//! Checkpointed pass orchestration for the Burnish pipeline.
//!
//! The orchestrator runs a fixed, ordered list of improvement passes over
//! durable, numbered snapshots of the project tree. Each pass copies the
//! previous stage into a fresh `<NN>_<tag>` directory, transforms it in
//! place, and must survive a full verification before becoming the input
//! to the next pass. Any verification failure aborts the run; completed
//! stages are never deleted, so every intermediate state stays available
//! for diffing and post-mortem inspection.

mod error;
mod orchestrator;
mod passes;
mod snapshot;
mod stage;

pub use error::PipelineError;
pub use orchestrator::{FINAL_DIR, Pipeline};
pub use passes::{PassContext, StagePass, standard_passes};
pub use snapshot::copy_tree;
pub use stage::{Stage, discover_latest_stage, parse_stage_name, stage_dir_name};
