// file: src/models/source_file.rs
// description: discovered tabular inputs and their columnar outputs
// reference: internal data structures

use crate::pipeline::WorkItem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub relative_path: String,
    /// File name without its final extension.
    pub base_name: String,
    pub size: u64,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, root: &Path, size: u64) -> Self {
        let path = path.into();
        let relative_path = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .to_string();
        let base_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path,
            relative_path,
            base_name,
            size,
        }
    }

    pub fn output_path(&self, output_dir: &Path, extension: &str) -> PathBuf {
        output_dir.join(format!("{}.{}", self.base_name, extension))
    }
}

impl WorkItem for SourceFile {
    fn key(&self) -> String {
        self.path.display().to_string()
    }

    fn weight(&self) -> u64 {
        self.size
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub source: PathBuf,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub bytes_written: u64,
}
