// file: src/converter/scanner.rs
// description: Directory walking and source file discovery by extension
// reference: https://docs.rs/walkdir

use crate::error::Result;
use crate::models::SourceFile;
use crate::utils::Validator;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub struct SourceScanner {
    suffix: String,
}

impl SourceScanner {
    pub fn new(extension: &str) -> Self {
        Self {
            suffix: format!(".{}", extension),
        }
    }

    /// Collects every file under `root` whose name ends with the source extension.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<SourceFile>> {
        Validator::validate_directory(root)?;
        info!("Scanning directory: {}", root.display());

        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable path under {}: {}", root.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if !self.matches(entry.path()) {
                debug!("Skipping file: {}", entry.path().display());
                continue;
            }

            let size = entry.metadata().map(|metadata| metadata.len()).unwrap_or(0);
            files.push(SourceFile::new(entry.path(), root, size));
        }

        info!("Found {} {} files", files.len(), &self.suffix[1..]);
        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().ends_with(&self.suffix))
            .unwrap_or(false)
    }
}
