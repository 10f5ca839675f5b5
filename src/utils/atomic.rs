// file: src/utils/atomic.rs
// description: write-then-rename file creation shared by both stages
// reference: https://docs.rs/uuid

use crate::error::{PipelineError, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Writes `target` through a hidden sibling file and renames it into place.
///
/// Readers never observe a partially written target, and when two writers race
/// on the same target the last rename wins. On failure the sibling is removed.
pub fn write_atomic<F>(target: &Path, write: F) -> Result<u64>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let staging = staging_path(target);

    let outcome = File::create(&staging)
        .map_err(|e| PipelineError::file_operation(&staging, e))
        .and_then(|mut file| {
            write(&mut file)?;
            file.sync_all()
                .map_err(|e| PipelineError::file_operation(&staging, e))
        })
        .and_then(|_| {
            fs::rename(&staging, target).map_err(|e| PipelineError::file_operation(target, e))
        });

    if let Err(err) = outcome {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }

    fs::metadata(target)
        .map(|metadata| metadata.len())
        .map_err(|e| PipelineError::file_operation(target, e))
}

fn staging_path(target: &Path) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
}
