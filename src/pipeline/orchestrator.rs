// file: src/pipeline/orchestrator.rs
// description: coordinates archive extraction and csv to parquet conversion
// reference: orchestrates the two best-effort stages in a fixed order

use crate::archive::ArchiveExtractor;
use crate::config::{Config, PipelineConfig};
use crate::converter::TabularConverter;
use crate::error::{PipelineError, Result};
use crate::models::{ExtractedEntry, OutputFile, PipelineReport, StageReport, StageSummary};
use crate::pipeline::WorkerPool;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

pub struct PipelineOrchestrator {
    paths: PipelineConfig,
    extractor: ArchiveExtractor,
    converter: TabularConverter,
    last_report: Option<PipelineReport>,
}

impl PipelineOrchestrator {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let pool = WorkerPool::new(config.workers.effective_workers())
            .with_progress(config.workers.show_progress, config.logging.colored);

        Ok(Self {
            paths: config.pipeline.clone(),
            extractor: ArchiveExtractor::new(pool.clone()),
            converter: TabularConverter::new(pool, &config.conversion)?,
            last_report: None,
        })
    }

    pub fn paths(&self) -> &PipelineConfig {
        &self.paths
    }

    pub fn last_report(&self) -> Option<&PipelineReport> {
        self.last_report.as_ref()
    }

    pub async fn extract_stage(&self) -> Result<StageReport<ExtractedEntry>> {
        self.extractor
            .extract(&self.paths.archive_path, &self.paths.csv_path)
            .await
    }

    pub async fn convert_stage(&self) -> Result<StageReport<OutputFile>> {
        self.converter
            .convert(&self.paths.csv_path, &self.paths.parquet_path)
            .await
    }

    /// Extracts the archive, then converts everything it produced.
    ///
    /// `output_override` replaces the stored output directory before running and
    /// stays in effect for later runs. Each call starts from scratch and clears the
    /// previous report, so a failed run leaves `last_report()` empty.
    pub async fn run(&mut self, output_override: Option<PathBuf>) -> Result<&mut Self> {
        self.last_report = None;
        if let Some(parquet_path) = output_override {
            self.paths.parquet_path = parquet_path;
        }
        self.paths.validate()?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!("Starting csv2parquet pipeline (run {})", run_id);

        let extraction = self.extract_stage().await?;
        let conversion = self.convert_stage().await?;

        let report = PipelineReport {
            run_id,
            started_at,
            archive_path: self.paths.archive_path.display().to_string(),
            csv_path: self.paths.csv_path.display().to_string(),
            parquet_path: self.paths.parquet_path.display().to_string(),
            extraction: extraction.summary(),
            conversion: conversion.summary(),
        };

        self.log_final_stats(&report);
        self.last_report = Some(report);

        Ok(self)
    }

    fn log_final_stats(&self, report: &PipelineReport) {
        info!("=== Pipeline Execution Summary ===");
        info!("Run: {}", report.run_id);
        log_stage(&report.extraction);
        log_stage(&report.conversion);
        if !report.is_clean() {
            warn!(
                "{} items failed; see the errors above for details",
                report.total_failures()
            );
        }
        info!("=================================");
    }
}

fn log_stage(summary: &StageSummary) {
    info!(
        "{}: {} succeeded, {} failed ({:.2}% success, {:.2} items/sec)",
        summary.stage,
        summary.succeeded,
        summary.failed,
        summary.success_rate(),
        summary.items_per_second()
    );
}

/// Builds a pipeline for the given paths and runs it once.
pub async fn unzip_csv_to_parquet(
    archive_path: &Path,
    csv_path: &Path,
    parquet_path: &Path,
    config: &Config,
) -> Result<PipelineReport> {
    let mut config = config.clone();
    config.pipeline = PipelineConfig::new(archive_path, csv_path, parquet_path);

    let mut orchestrator = PipelineOrchestrator::new(&config)?;
    orchestrator.run(None).await?;

    orchestrator
        .last_report
        .take()
        .ok_or_else(|| PipelineError::Task("pipeline finished without a report".to_string()))
}
