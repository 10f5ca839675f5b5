// file: src/test_util.rs
// description: fixtures shared by the unit tests: zip archives, csv trees, parquet readers
// reference: https://docs.rs/zip, https://docs.rs/parquet

use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Writes a stored (uncompressed) archive; names ending in `/` become directories.
pub(crate) fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, content) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
    }

    zip.finish().unwrap();
}

/// Flips the first byte of `marker` inside the stored entry data so its CRC no longer matches.
pub(crate) fn corrupt_entry(path: &Path, marker: &str) {
    let mut bytes = fs::read(path).unwrap();
    let marker = marker.as_bytes();
    let offset = bytes
        .windows(marker.len())
        .position(|window| window == marker)
        .unwrap();
    bytes[offset] ^= 0xFF;
    fs::write(path, bytes).unwrap();
}

pub(crate) fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Row count and column names of a parquet file.
pub(crate) fn parquet_shape(path: &Path) -> (i64, Vec<String>) {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path).unwrap()).unwrap();
    let rows = builder.metadata().file_metadata().num_rows();
    let columns = builder
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect();
    (rows, columns)
}

pub(crate) fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
