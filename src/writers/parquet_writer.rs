use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::{LoadOutcome, RecordSink};
use crate::error::{EtlError, Result};
use crate::models::Dataset;
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use crate::utils::unique_load_path;

/// Writes every load as a new Parquet file named after its table
pub struct ParquetSink {
    output_dir: PathBuf,
    compression: Compression,
}

impl ParquetSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            compression: Compression::SNAPPY,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(EtlError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(DEFAULT_ROW_GROUP_SIZE)
            .build()
    }

    /// Write `batch` to a file that must not exist yet
    pub fn write_batch(&self, batch: &RecordBatch, path: &Path) -> Result<()> {
        let file = OpenOptions::new().write(true).create_new(true).open(path)?;

        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(self.properties()))?;
        writer.write(batch)?;
        writer.close()?;

        Ok(())
    }

    /// Read up to `limit` rows back from a file written by this sink
    pub fn read_batches(&self, path: &Path, limit: usize) -> Result<Vec<RecordBatch>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(limit.clamp(1, 8192))
            .with_limit(limit)
            .build()?;

        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch?);
        }
        Ok(batches)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let metadata = builder.metadata();

        let row_group_sizes = metadata
            .row_groups()
            .iter()
            .map(|rg| rg.num_rows())
            .collect::<Vec<_>>();
        let compression = metadata
            .row_groups()
            .first()
            .and_then(|rg| rg.columns().first())
            .map(|column| column.compression())
            .unwrap_or(Compression::UNCOMPRESSED);

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            row_groups: metadata.num_row_groups(),
            row_group_sizes,
            file_size: fs::metadata(path)?.len(),
            compression,
            schema: builder.schema().clone(),
        })
    }
}

impl RecordSink for ParquetSink {
    fn probe(&self) -> Result<()> {
        let connectivity = |e: std::io::Error| EtlError::Connectivity {
            target: self.output_dir.display().to_string(),
            message: e.to_string(),
        };

        fs::create_dir_all(&self.output_dir).map_err(connectivity)?;
        let metadata = fs::metadata(&self.output_dir).map_err(connectivity)?;
        if metadata.permissions().readonly() {
            return Err(EtlError::Connectivity {
                target: self.output_dir.display().to_string(),
                message: "output directory is read-only".to_string(),
            });
        }
        Ok(())
    }

    fn load(&mut self, dataset: Dataset, batch: &RecordBatch) -> Result<LoadOutcome> {
        if batch.num_rows() == 0 {
            debug!(table = %dataset, "Nothing to load");
            return Ok(LoadOutcome::new(dataset, 0, 0));
        }

        let path = unique_load_path(&self.output_dir, dataset.table_name(), Utc::now());
        if let Err(e) = self.write_batch(batch, &path) {
            error!(
                table = %dataset,
                rows = batch.num_rows(),
                path = %path.display(),
                error = %e,
                "Failed to write rows"
            );
            return Ok(LoadOutcome::new(dataset, 0, batch.num_rows()));
        }

        info!(
            table = %dataset,
            rows = batch.num_rows(),
            path = %path.display(),
            "Loaded rows"
        );
        Ok(LoadOutcome::new(dataset, batch.num_rows(), 0).with_location(path))
    }
}

#[derive(Debug, Clone)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: usize,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
    pub schema: SchemaRef,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("Total rows: {}\n", self.total_rows));
        summary.push_str(&format!("Row groups: {}\n", self.row_groups));
        summary.push_str(&format!(
            "File size: {:.1} KB\n",
            self.file_size as f64 / 1024.0
        ));
        summary.push_str(&format!("Compression: {:?}\n", self.compression));
        summary.push_str("Columns:\n");
        for field in self.schema.fields() {
            summary.push_str(&format!("  {}: {}\n", field.name(), field.data_type()));
        }
        summary
    }
}
