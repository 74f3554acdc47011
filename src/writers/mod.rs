//! Load seam: a sink appends one unified batch per target table

pub mod memory_sink;
pub mod parquet_writer;

pub use memory_sink::MemorySink;
pub use parquet_writer::{ParquetFileInfo, ParquetSink};

use arrow::record_batch::RecordBatch;
use std::path::PathBuf;

use crate::error::Result;
use crate::models::Dataset;

/// Rows accepted and rejected by one load call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub table: String,
    pub loaded: usize,
    pub failed: usize,
    /// Where the rows ended up, when the sink writes files
    pub location: Option<PathBuf>,
}

impl LoadOutcome {
    pub fn new(dataset: Dataset, loaded: usize, failed: usize) -> Self {
        Self {
            table: dataset.table_name().to_string(),
            loaded,
            failed,
            location: None,
        }
    }

    pub fn with_location(mut self, location: PathBuf) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

pub trait RecordSink {
    /// Fails when the destination cannot be reached
    fn probe(&self) -> Result<()>;

    /// Append every row of `batch` to the `dataset` table; existing rows are never touched
    fn load(&mut self, dataset: Dataset, batch: &RecordBatch) -> Result<LoadOutcome>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn probe(&self) -> Result<()> {
        (**self).probe()
    }

    fn load(&mut self, dataset: Dataset, batch: &RecordBatch) -> Result<LoadOutcome> {
        (**self).load(dataset, batch)
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn probe(&self) -> Result<()> {
        (**self).probe()
    }

    fn load(&mut self, dataset: Dataset, batch: &RecordBatch) -> Result<LoadOutcome> {
        (**self).load(dataset, batch)
    }
}
