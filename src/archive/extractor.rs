// file: src/archive/extractor.rs
// description: parallel best-effort extraction of every entry in a zip archive
// reference: https://docs.rs/zip

use crate::error::{PipelineError, Result};
use crate::models::{ArchiveEntry, ExtractedEntry, Stage, StageReport};
use crate::pipeline::WorkerPool;
use crate::utils::{Validator, write_atomic};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use zip::ZipArchive;

#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    pool: WorkerPool,
}

impl ArchiveExtractor {
    pub fn new(pool: WorkerPool) -> Self {
        Self { pool }
    }

    /// Reads the central directory once. Any failure here is fatal to the run.
    pub fn list_entries(archive_path: &Path) -> Result<Vec<ArchiveEntry>> {
        let mut archive = open_archive(archive_path)?;
        let mut entries = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .map_err(|e| PipelineError::ArchiveOpen {
                    path: archive_path.to_path_buf(),
                    message: format!("unreadable entry #{}: {}", index, e),
                })?;

            entries.push(ArchiveEntry {
                index,
                name: file.name().to_string(),
                relative_path: file.enclosed_name(),
                is_dir: file.is_dir(),
                size: file.size(),
                compressed_size: file.compressed_size(),
                crc32: file.crc32(),
            });
        }

        Ok(entries)
    }

    /// Extracts a single entry through its own handle on the archive.
    pub fn extract_entry(
        archive_path: &Path,
        entry: &ArchiveEntry,
        destination: &Path,
    ) -> Result<ExtractedEntry> {
        let fail = |message: String| PipelineError::EntryExtraction {
            entry: entry.name.clone(),
            message,
        };

        let relative = entry
            .relative_path
            .as_ref()
            .ok_or_else(|| fail("entry path escapes the destination directory".to_string()))?;
        let target = destination.join(relative);

        debug!("Extracting '{}'...", entry.name);

        if entry.is_dir {
            create_contained_dir(&target, destination).map_err(|e| fail(e.to_string()))?;
            return Ok(ExtractedEntry {
                entry: entry.name.clone(),
                path: target,
                is_dir: true,
                bytes_written: 0,
            });
        }

        let parent = target.parent().unwrap_or(destination);
        create_contained_dir(parent, destination).map_err(|e| fail(e.to_string()))?;

        let mut archive = open_archive(archive_path).map_err(|e| fail(e.to_string()))?;
        let mut zip_file = archive
            .by_index(entry.index)
            .map_err(|e| fail(e.to_string()))?;

        let bytes_written = write_atomic(&target, |out| {
            io::copy(&mut zip_file, out)?;
            Ok(())
        })
        .map_err(|e| fail(e.to_string()))?;

        Ok(ExtractedEntry {
            entry: entry.name.clone(),
            path: target,
            is_dir: false,
            bytes_written,
        })
    }

    /// Extracts every entry of `archive_path` under `destination`.
    ///
    /// Only opening the archive is fatal; per-entry failures end up in the report.
    pub async fn extract(
        &self,
        archive_path: &Path,
        destination: &Path,
    ) -> Result<StageReport<ExtractedEntry>> {
        info!(
            "Extracting {} into {}",
            archive_path.display(),
            destination.display()
        );

        let archive: PathBuf = archive_path.to_path_buf();
        let entries = tokio::task::spawn_blocking(move || Self::list_entries(&archive))
            .await
            .map_err(|e| PipelineError::Task(format!("Archive listing task failed: {}", e)))??;

        fs::create_dir_all(destination)
            .map_err(|e| PipelineError::file_operation(destination, e))?;

        let unsafe_entries = entries.iter().filter(|entry| !entry.is_safe()).count();
        if unsafe_entries > 0 {
            warn!(
                "{} archive entries resolve outside {} and will be rejected",
                unsafe_entries,
                destination.display()
            );
        }

        let archive = Arc::new(archive_path.to_path_buf());
        let destination_dir = Arc::new(destination.to_path_buf());

        let report = self
            .pool
            .run(Stage::Extraction, entries, move |entry: ArchiveEntry| {
                Self::extract_entry(&archive, &entry, &destination_dir)
            })
            .await;

        info!(
            "...done extracting zip: {} entries extracted, {} failed",
            report.succeeded(),
            report.failed()
        );

        Ok(report)
    }
}

/// Creates `dir` only if its deepest existing ancestor resolves inside `destination`.
fn create_contained_dir(dir: &Path, destination: &Path) -> Result<()> {
    fs::create_dir_all(destination).map_err(|e| PipelineError::file_operation(destination, e))?;

    let existing = dir
        .ancestors()
        .find(|ancestor| ancestor.exists())
        .unwrap_or(destination);
    Validator::validate_within_base_dir(existing, destination)?;

    fs::create_dir_all(dir).map_err(|e| PipelineError::file_operation(dir, e))?;
    Validator::validate_within_base_dir(dir, destination)
}

fn open_archive(archive_path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(archive_path).map_err(|e| PipelineError::ArchiveOpen {
        path: archive_path.to_path_buf(),
        message: e.to_string(),
    })?;

    ZipArchive::new(BufReader::new(file)).map_err(|e| PipelineError::ArchiveOpen {
        path: archive_path.to_path_buf(),
        message: e.to_string(),
    })
}
