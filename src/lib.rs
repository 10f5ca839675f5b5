// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod archive;
pub mod config;
pub mod converter;
pub mod error;
pub mod exporter;
pub mod models;
pub mod pipeline;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_util;

pub use archive::ArchiveExtractor;
pub use config::{
    Config, ConversionConfig, LoggingConfig, OutputCompression, PipelineConfig, WorkerConfig,
};
pub use converter::{CsvToParquet, SourceScanner, TabularConverter};
pub use error::{PipelineError, Result};
pub use exporter::ReportExporter;
pub use models::{
    ArchiveEntry, ExtractedEntry, OutputFile, PipelineReport, SourceFile, Stage, StageReport,
    StageSummary, TaskFailure,
};
pub use pipeline::{PipelineOrchestrator, ProgressTracker, WorkItem, WorkerPool, unzip_csv_to_parquet};
pub use utils::Validator;
