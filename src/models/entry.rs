// file: src/models/entry.rs
// description: archive entry metadata and extraction outcomes
// reference: https://docs.rs/zip

use crate::pipeline::WorkItem;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One item of the archive's central directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub index: usize,
    pub name: String,
    /// `None` when the stored name would resolve outside the destination.
    pub relative_path: Option<PathBuf>,
    pub is_dir: bool,
    pub size: u64,
    pub compressed_size: u64,
    pub crc32: u32,
}

impl ArchiveEntry {
    pub fn is_safe(&self) -> bool {
        self.relative_path.is_some()
    }
}

impl WorkItem for ArchiveEntry {
    fn key(&self) -> String {
        self.name.clone()
    }

    fn weight(&self) -> u64 {
        self.size
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntry {
    pub entry: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub bytes_written: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_key_and_safety() {
        let entry = ArchiveEntry {
            index: 0,
            name: "../escape.csv".to_string(),
            relative_path: None,
            is_dir: false,
            size: 12,
            compressed_size: 12,
            crc32: 0,
        };

        assert_eq!(entry.key(), "../escape.csv");
        assert_eq!(entry.weight(), 12);
        assert!(!entry.is_safe());
    }
}
