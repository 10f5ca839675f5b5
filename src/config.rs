// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "CSV2PARQUET";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub workers: WorkerConfig,
    pub conversion: ConversionConfig,
    pub logging: LoggingConfig,
}

/// The archive, intermediate and output locations of one pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub archive_path: PathBuf,
    #[serde(default)]
    pub csv_path: PathBuf,
    #[serde(default)]
    pub parquet_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// Defaults to the host's available parallelism when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_workers: Option<usize>,
    pub show_progress: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversionConfig {
    pub source_extension: String,
    pub output_extension: String,
    pub delimiter: char,
    pub has_header: bool,
    pub batch_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infer_max_records: Option<usize>,
    pub compression: OutputCompression,
    pub reuse_output_dir: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputCompression {
    Uncompressed,
    #[default]
    Snappy,
    Zstd,
    Gzip,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub colored: bool,
    pub verbose: bool,
}

impl PipelineConfig {
    pub fn new(
        archive_path: impl Into<PathBuf>,
        csv_path: impl Into<PathBuf>,
        parquet_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            archive_path: archive_path.into(),
            csv_path: csv_path.into(),
            parquet_path: parquet_path.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("archive_path", &self.archive_path),
            ("csv_path", &self.csv_path),
            ("parquet_path", &self.parquet_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(PipelineError::Config(format!("{} must be set", name)));
            }
        }
        Ok(())
    }
}

impl WorkerConfig {
    pub fn effective_workers(&self) -> usize {
        self.parallel_workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            parallel_workers: None,
            show_progress: true,
        }
    }
}

impl ConversionConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(PipelineError::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )))
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            source_extension: "csv".to_string(),
            output_extension: "parquet".to_string(),
            delimiter: ',',
            has_header: true,
            batch_size: 8192,
            infer_max_records: None,
            compression: OutputCompression::Snappy,
            reuse_output_dir: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            colored: true,
            verbose: false,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            workers: WorkerConfig::default(),
            conversion: ConversionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers.parallel_workers == Some(0) {
            return Err(PipelineError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.conversion.batch_size == 0 {
            return Err(PipelineError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        self.conversion.delimiter_byte()?;
        Validator::validate_extension(&self.conversion.source_extension)
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Validator::validate_extension(&self.conversion.output_extension)
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        if self.conversion.source_extension == self.conversion.output_extension {
            return Err(PipelineError::Config(
                "source_extension and output_extension must differ".to_string(),
            ));
        }

        Ok(())
    }
}
