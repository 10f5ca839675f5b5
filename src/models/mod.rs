// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod entry;
pub mod report;
pub mod source_file;

pub use entry::{ArchiveEntry, ExtractedEntry};
pub use report::{PipelineReport, Stage, StageReport, StageSummary, TaskFailure};
pub use source_file::{OutputFile, SourceFile};
