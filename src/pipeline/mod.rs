// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
mod pool;
mod progress;

pub use orchestrator::{PipelineOrchestrator, unzip_csv_to_parquet};
pub use pool::{WorkItem, WorkerPool};
pub use progress::ProgressTracker;
