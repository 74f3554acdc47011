use arrow::record_batch::RecordBatch;

use super::{LoadOutcome, RecordSink};
use crate::error::{EtlError, Result};
use crate::models::Dataset;

/// Keeps loaded batches in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    loads: Vec<(Dataset, RecordBatch)>,
    offline: bool,
    unwritable: bool,
    reject_rows: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose probe fails
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// A sink that probes fine but errors on every load
    pub fn unwritable() -> Self {
        Self {
            unwritable: true,
            ..Self::default()
        }
    }

    /// Report the last `rows` rows of every load as failed
    pub fn rejecting(rows: usize) -> Self {
        Self {
            reject_rows: rows,
            ..Self::default()
        }
    }

    pub fn loads(&self) -> &[(Dataset, RecordBatch)] {
        &self.loads
    }

    pub fn total_rows(&self) -> usize {
        self.loads.iter().map(|(_, batch)| batch.num_rows()).sum()
    }
}

impl RecordSink for MemorySink {
    fn probe(&self) -> Result<()> {
        if self.offline {
            return Err(EtlError::Connectivity {
                target: "memory sink".to_string(),
                message: "sink is offline".to_string(),
            });
        }
        Ok(())
    }

    fn load(&mut self, dataset: Dataset, batch: &RecordBatch) -> Result<LoadOutcome> {
        self.probe()?;
        if self.unwritable {
            return Err(EtlError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "sink is not writable",
            )));
        }

        let failed = self.reject_rows.min(batch.num_rows());
        let loaded = batch.num_rows() - failed;
        self.loads.push((dataset, batch.slice(0, loaded)));

        Ok(LoadOutcome::new(dataset, loaded, failed))
    }
}
