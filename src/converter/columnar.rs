// file: src/converter/columnar.rs
// description: converts one delimited text file into a parquet file with inferred schema
// reference: https://docs.rs/arrow/latest/arrow/csv, https://docs.rs/parquet

use crate::config::{ConversionConfig, OutputCompression};
use crate::error::{PipelineError, Result};
use crate::models::{OutputFile, SourceFile};
use crate::utils::write_atomic;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow_array::RecordBatch;
use arrow_schema::ArrowError;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CsvToParquet {
    output_extension: String,
    delimiter: u8,
    has_header: bool,
    batch_size: usize,
    infer_max_records: Option<usize>,
    compression: OutputCompression,
}

impl CsvToParquet {
    pub fn new(config: &ConversionConfig) -> Result<Self> {
        Ok(Self {
            output_extension: config.output_extension.clone(),
            delimiter: config.delimiter_byte()?,
            has_header: config.has_header,
            batch_size: config.batch_size.max(1),
            infer_max_records: config.infer_max_records,
            compression: config.compression,
        })
    }

    pub fn output_extension(&self) -> &str {
        &self.output_extension
    }

    /// Loads `source` fully, infers its schema and writes `<base_name>.<ext>` into `output_dir`.
    pub fn convert_file(&self, source: &SourceFile, output_dir: &Path) -> Result<OutputFile> {
        let target = source.output_path(output_dir, &self.output_extension);
        let wrap = |e: PipelineError| PipelineError::Conversion {
            path: source.path.clone(),
            message: e.to_string(),
        };

        let (schema, batches) = self.read_batches(&source.path).map_err(wrap)?;
        let rows: usize = batches.iter().map(|batch| batch.num_rows()).sum();
        let columns = schema.fields().len();

        let properties = WriterProperties::builder()
            .set_compression(self.parquet_compression())
            .build();

        let bytes_written = write_atomic(&target, |file| {
            let mut writer = ArrowWriter::try_new(file, Arc::clone(&schema), Some(properties))?;
            for batch in &batches {
                writer.write(batch)?;
            }
            writer.close()?;
            Ok(())
        })
        .map_err(wrap)?;

        debug!(
            "Converted {} -> {} ({} rows, {} columns)",
            source.relative_path,
            target.display(),
            rows,
            columns
        );

        Ok(OutputFile {
            source: source.path.clone(),
            path: target,
            rows,
            columns,
            bytes_written,
        })
    }

    fn read_batches(&self, path: &Path) -> Result<(arrow_schema::SchemaRef, Vec<RecordBatch>)> {
        let mut file = File::open(path).map_err(|e| PipelineError::file_operation(path, e))?;

        // Short rows are padded with nulls rather than rejected.
        let format = Format::default()
            .with_header(self.has_header)
            .with_delimiter(self.delimiter)
            .with_truncated_rows(true);
        let (schema, _) = format.infer_schema(&mut file, self.infer_max_records)?;
        if schema.fields().is_empty() {
            return Err(PipelineError::Validation(
                "no columns to parse from file".to_string(),
            ));
        }
        let schema = Arc::new(schema);

        file.seek(SeekFrom::Start(0))
            .map_err(|e| PipelineError::file_operation(path, e))?;

        let reader = ReaderBuilder::new(Arc::clone(&schema))
            .with_format(format)
            .with_truncated_rows(true)
            .with_batch_size(self.batch_size)
            .build(file)?;

        let batches = reader.collect::<std::result::Result<Vec<_>, ArrowError>>()?;
        Ok((schema, batches))
    }

    fn parquet_compression(&self) -> Compression {
        match self.compression {
            OutputCompression::Uncompressed => Compression::UNCOMPRESSED,
            OutputCompression::Snappy => Compression::SNAPPY,
            OutputCompression::Zstd => Compression::ZSTD(ZstdLevel::default()),
            OutputCompression::Gzip => Compression::GZIP(GzipLevel::default()),
        }
    }
}
