// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod progress;
mod session;

pub use progress::{IndexingStats, ProgressSpinner};
pub use session::{Pipeline, PipelineState, Upload};
