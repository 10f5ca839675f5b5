// file: src/converter/mod.rs
// description: parallel best-effort conversion of every discovered csv file to parquet
// reference: pipeline processing stage

pub mod columnar;
pub mod scanner;

pub use columnar::CsvToParquet;
pub use scanner::SourceScanner;

use crate::config::ConversionConfig;
use crate::error::{PipelineError, Result};
use crate::models::{OutputFile, SourceFile, Stage, StageReport};
use crate::pipeline::WorkerPool;
use crate::utils::Validator;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub struct TabularConverter {
    pool: WorkerPool,
    source_extension: String,
    writer: Arc<CsvToParquet>,
    reuse_output_dir: bool,
}

impl TabularConverter {
    pub fn new(pool: WorkerPool, config: &ConversionConfig) -> Result<Self> {
        Ok(Self {
            pool,
            source_extension: config.source_extension.clone(),
            writer: Arc::new(CsvToParquet::new(config)?),
            reuse_output_dir: config.reuse_output_dir,
        })
    }

    /// Creates `output_dir` without creating missing parents.
    ///
    /// An existing directory is a `DirectoryCollision` unless reuse is enabled.
    pub fn prepare_output_dir(&self, output_dir: &Path) -> Result<()> {
        Validator::validate_parent_exists(output_dir)?;

        match fs::create_dir(output_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if self.reuse_output_dir && output_dir.is_dir() {
                    warn!(
                        "Reusing existing output directory {}; same-named files will be overwritten",
                        output_dir.display()
                    );
                    Ok(())
                } else {
                    Err(PipelineError::DirectoryCollision(output_dir.to_path_buf()))
                }
            }
            Err(e) => Err(PipelineError::file_operation(output_dir, e)),
        }
    }

    /// Converts every source file under `source_dir` into `output_dir`, flattening paths.
    pub async fn convert(
        &self,
        source_dir: &Path,
        output_dir: &Path,
    ) -> Result<StageReport<OutputFile>> {
        info!(
            "Converting {} files under {} to {}...",
            self.source_extension,
            source_dir.display(),
            self.writer.output_extension()
        );

        self.prepare_output_dir(output_dir)?;

        let root = source_dir.to_path_buf();
        let extension = self.source_extension.clone();
        let files = tokio::task::spawn_blocking(move || {
            SourceScanner::new(&extension).scan_directory(&root)
        })
        .await
        .map_err(|e| PipelineError::Task(format!("File scanning task failed: {}", e)))??;

        let writer = Arc::clone(&self.writer);
        let output = Arc::new(output_dir.to_path_buf());

        let report = self
            .pool
            .run(Stage::Conversion, files, move |file: SourceFile| {
                writer.convert_file(&file, &output)
            })
            .await;

        info!(
            "...done converting: {} files written, {} failed",
            report.succeeded(),
            report.failed()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{file_names, parquet_shape, write_file};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn converter(reuse_output_dir: bool) -> TabularConverter {
        let config = ConversionConfig {
            reuse_output_dir,
            ..ConversionConfig::default()
        };
        TabularConverter::new(WorkerPool::new(4), &config).unwrap()
    }

    #[tokio::test]
    async fn test_convert_flattens_directories() {
        let temp = TempDir::new().unwrap();
        let csv = temp.path().join("csv");
        write_file(&csv, "a.csv", "x,y\n1,2\n3,4\n");
        write_file(&csv, "2024/b.csv", "x\n5\n");
        write_file(&csv, "2024/q1/c.csv", "x,y,z\n1,2,3\n");
        write_file(&csv, "notes.txt", "not tabular");

        let out = temp.path().join("parquet");
        let report = converter(false).convert(&csv, &out).await.unwrap();

        assert_eq!(report.succeeded(), 3);
        assert!(report.is_clean());
        assert_eq!(
            file_names(&out),
            vec!["a.parquet", "b.parquet", "c.parquet"]
        );
        assert_eq!(parquet_shape(&out.join("a.parquet")), (2, vec!["x".to_string(), "y".to_string()]));
        assert_eq!(parquet_shape(&out.join("c.parquet")).1.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_file_is_isolated() {
        let temp = TempDir::new().unwrap();
        let csv = temp.path().join("csv");
        write_file(&csv, "good1.csv", "a,b\n1,2\n");
        write_file(&csv, "good2.csv", "a,b\n3,4\n");
        write_file(&csv, "good3.csv", "a,b\n5,6\n");
        write_file(&csv, "bad.csv", "a,b\n1,2\n3,4,5,6\n");

        let out = temp.path().join("parquet");
        let report = converter(false).convert(&csv, &out).await.unwrap();

        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.failed(), 1);
        assert!(report.failures[0].key.ends_with("bad.csv"));
        assert_eq!(
            file_names(&out),
            vec!["good1.parquet", "good2.parquet", "good3.parquet"]
        );
    }

    #[tokio::test]
    async fn test_same_base_name_collision_keeps_exactly_one() {
        let temp = TempDir::new().unwrap();
        let csv = temp.path().join("csv");
        write_file(&csv, "east/sales.csv", "region,amount\neast,1\n");
        write_file(&csv, "west/sales.csv", "region,amount\nwest,2\nwest,3\n");

        let out = temp.path().join("parquet");
        let report = converter(false).convert(&csv, &out).await.unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(file_names(&out), vec!["sales.parquet"]);
        let (rows, _) = parquet_shape(&out.join("sales.parquet"));
        assert!(rows == 1 || rows == 2);
    }

    #[tokio::test]
    async fn test_existing_output_dir_collides() {
        let temp = TempDir::new().unwrap();
        let csv = temp.path().join("csv");
        write_file(&csv, "a.csv", "x\n1\n");
        let out = temp.path().join("parquet");
        fs::create_dir(&out).unwrap();

        let result = converter(false).convert(&csv, &out).await;
        assert!(matches!(result, Err(PipelineError::DirectoryCollision(_))));
    }

    #[tokio::test]
    async fn test_existing_output_dir_reused_when_enabled() {
        let temp = TempDir::new().unwrap();
        let csv = temp.path().join("csv");
        write_file(&csv, "a.csv", "x\n1\n");
        let out = temp.path().join("parquet");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("a.parquet"), "stale").unwrap();

        let report = converter(true).convert(&csv, &out).await.unwrap();
        assert_eq!(report.succeeded(), 1);
        assert_eq!(parquet_shape(&out.join("a.parquet")).0, 1);
    }

    #[test]
    fn test_output_parent_must_exist() {
        let temp = TempDir::new().unwrap();
        let result = converter(false).prepare_output_dir(&temp.path().join("missing/parquet"));
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_source_dir() {
        let temp = TempDir::new().unwrap();
        let csv = temp.path().join("csv");
        fs::create_dir(&csv).unwrap();

        let out = temp.path().join("parquet");
        let report = converter(false).convert(&csv, &out).await.unwrap();

        assert_eq!(report.total(), 0);
        assert!(out.is_dir());
        assert!(file_names(&out).is_empty());
    }
}
