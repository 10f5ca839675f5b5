// file: src/models/report.rs
// description: per-task outcomes and aggregated stage and run reports
// reference: structured replacement for log-only failure reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Extraction,
    Conversion,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extraction => write!(f, "extraction"),
            Stage::Conversion => write!(f, "conversion"),
        }
    }
}

/// A unit of work that did not complete, keyed by entry name or file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub key: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct StageReport<T> {
    pub stage: Stage,
    pub outputs: Vec<T>,
    pub failures: Vec<TaskFailure>,
    pub bytes_processed: u64,
    pub elapsed: Duration,
}

impl<T> StageReport<T> {
    pub fn empty(stage: Stage) -> Self {
        Self {
            stage,
            outputs: Vec::new(),
            failures: Vec::new(),
            bytes_processed: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outputs.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.succeeded() + self.failed()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> StageSummary {
        StageSummary {
            stage: self.stage,
            succeeded: self.succeeded(),
            failed: self.failed(),
            bytes_processed: self.bytes_processed,
            duration_ms: self.elapsed.as_millis() as u64,
            failures: self.failures.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage: Stage,
    pub succeeded: usize,
    pub failed: usize,
    pub bytes_processed: u64,
    pub duration_ms: u64,
    pub failures: Vec<TaskFailure>,
}

impl StageSummary {
    pub fn items_per_second(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.succeeded as f64 / (self.duration_ms as f64 / 1000.0)
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.succeeded + self.failed;
        if total == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / total as f64) * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub archive_path: String,
    pub csv_path: String,
    pub parquet_path: String,
    pub extraction: StageSummary,
    pub conversion: StageSummary,
}

impl PipelineReport {
    pub fn total_failures(&self) -> usize {
        self.extraction.failed + self.conversion.failed
    }

    pub fn is_clean(&self) -> bool {
        self.total_failures() == 0
    }
}
