// file: src/utils/validation.rs
// description: path and setting validation helpers
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use std::fs;
use std::path::Path;

pub struct Validator;

impl Validator {
    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(PipelineError::Validation(format!(
                "Directory does not exist: {}",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(PipelineError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    /// The output directory is created non-recursively, so its parent must exist.
    pub fn validate_parent_exists(path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Self::validate_directory(parent),
            _ => Ok(()),
        }
    }

    pub fn validate_extension(extension: &str) -> Result<()> {
        if extension.is_empty() {
            return Err(PipelineError::Validation(
                "Extension cannot be empty".to_string(),
            ));
        }

        if extension.contains('.') || extension.contains('/') || extension.contains('\\') {
            return Err(PipelineError::Validation(format!(
                "Extension must be a bare suffix without separators: {}",
                extension
            )));
        }

        Ok(())
    }

    pub fn validate_within_base_dir(path: &Path, base_dir: &Path) -> Result<()> {
        let canonical_path = fs::canonicalize(path).map_err(|e| {
            PipelineError::Validation(format!(
                "Cannot canonicalize path {}: {}",
                path.display(),
                e
            ))
        })?;

        let canonical_base = fs::canonicalize(base_dir).map_err(|e| {
            PipelineError::Validation(format!(
                "Cannot canonicalize base dir {}: {}",
                base_dir.display(),
                e
            ))
        })?;

        if !canonical_path.starts_with(&canonical_base) {
            return Err(PipelineError::Validation(format!(
                "Path traversal detected ({} outside {})",
                canonical_path.display(),
                canonical_base.display()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_directory() {
        let temp = TempDir::new().unwrap();
        assert!(Validator::validate_directory(temp.path()).is_ok());
        assert!(Validator::validate_directory(Path::new("/nonexistent")).is_err());
    }

    #[test]
    fn test_validate_parent_exists() {
        let temp = TempDir::new().unwrap();
        assert!(Validator::validate_parent_exists(&temp.path().join("out")).is_ok());
        assert!(Validator::validate_parent_exists(&temp.path().join("missing/out")).is_err());
        assert!(Validator::validate_parent_exists(Path::new("relative")).is_ok());
    }

    #[test]
    fn test_validate_extension() {
        assert!(Validator::validate_extension("csv").is_ok());
        assert!(Validator::validate_extension("").is_err());
        assert!(Validator::validate_extension(".csv").is_err());
        assert!(Validator::validate_extension("a/b").is_err());
    }

    #[test]
    fn test_validate_within_base_dir() {
        let base = TempDir::new().unwrap();
        let file_path = base.path().join("nested/file.csv");
        fs::create_dir_all(file_path.parent().unwrap()).unwrap();
        fs::write(&file_path, "a,b\n1,2\n").unwrap();

        assert!(Validator::validate_within_base_dir(&file_path, base.path()).is_ok());

        let outside = TempDir::new().unwrap();
        let outside_file = outside.path().join("test.csv");
        fs::write(&outside_file, "a,b\n1,2\n").unwrap();

        assert!(Validator::validate_within_base_dir(&outside_file, base.path()).is_err());
    }
}
