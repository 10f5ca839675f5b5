// file: src/exporter/json.rs
// description: json export of pipeline run reports

use crate::error::{PipelineError, Result};
use crate::models::PipelineReport;
use crate::utils::write_atomic;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ReportExporter {
    output_path: PathBuf,
    pretty: bool,
}

impl ReportExporter {
    pub fn new(output_path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            output_path: output_path.into(),
            pretty,
        }
    }

    pub fn export(&self, report: &PipelineReport) -> Result<()> {
        if let Some(parent) = self.output_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| PipelineError::file_operation(parent, e))?;
        }

        let body = if self.pretty {
            serde_json::to_vec_pretty(report)
        } else {
            serde_json::to_vec(report)
        }
        .map_err(|e| PipelineError::Serialization(e.to_string()))?;

        write_atomic(&self.output_path, |file| {
            file.write_all(&body)?;
            Ok(())
        })?;

        info!("Run report written to {}", self.output_path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<PipelineReport> {
        let body = fs::read(path).map_err(|e| PipelineError::file_operation(path, e))?;
        serde_json::from_slice(&body).map_err(|e| PipelineError::Serialization(e.to_string()))
    }
}
