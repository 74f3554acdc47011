use std::collections::BTreeMap;

use crate::error::{EtlError, Result};
use crate::extractors::Extraction;
use crate::models::Dataset;
use crate::processors::Reconciliation;
use crate::transformers::Discard;
use crate::writers::LoadOutcome;

const MAX_DISCARD_EXAMPLES: usize = 10;

/// Per-stage tallies of one pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub target: Dataset,
    pub mesh_points: usize,
    pub zones_existing: usize,
    pub zones_inserted: usize,
    pub fetch_succeeded: usize,
    pub fetch_failed: usize,
    pub samples: usize,
    pub transformed: usize,
    /// Discard counts keyed by `Discard::label`
    pub discards: BTreeMap<&'static str, usize>,
    /// Rule violations per normalized field
    pub field_violations: BTreeMap<String, usize>,
    pub discard_examples: Vec<String>,
    pub load: Option<LoadOutcome>,
}

impl RunReport {
    pub fn new(target: Dataset) -> Self {
        Self {
            target,
            mesh_points: 0,
            zones_existing: 0,
            zones_inserted: 0,
            fetch_succeeded: 0,
            fetch_failed: 0,
            samples: 0,
            transformed: 0,
            discards: BTreeMap::new(),
            field_violations: BTreeMap::new(),
            discard_examples: Vec::new(),
            load: None,
        }
    }

    pub fn record_reconciliation(&mut self, reconciliation: &Reconciliation) {
        self.zones_existing = reconciliation.existing;
        self.zones_inserted = reconciliation.inserted.len();
    }

    pub fn record_extraction(&mut self, extraction: &Extraction) {
        self.fetch_succeeded = extraction.succeeded;
        self.fetch_failed = extraction.failed;
        self.samples = extraction.samples.len();
    }

    pub fn record_discard(&mut self, discard: &Discard) {
        *self.discards.entry(discard.label()).or_default() += 1;
        if let Discard::Invalid(violation) = discard {
            *self
                .field_violations
                .entry(violation.field.clone())
                .or_default() += 1;
        }
        if self.discard_examples.len() < MAX_DISCARD_EXAMPLES {
            self.discard_examples.push(discard.to_string());
        }
    }

    pub fn discarded(&self) -> usize {
        self.discards.values().sum()
    }

    /// Rows the sink rejected
    pub fn failed_rows(&self) -> usize {
        self.load.as_ref().map_or(0, |outcome| outcome.failed)
    }

    /// Error when any row failed to load
    pub fn check_load(&self) -> Result<()> {
        match &self.load {
            Some(outcome) if !outcome.is_complete() => Err(EtlError::LoadFailed {
                table: outcome.table.clone(),
                failed: outcome.failed,
            }),
            _ => Ok(()),
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Pipeline Run Report ===\n");
        summary.push_str(&format!("Target table: {}\n", self.target));
        summary.push_str(&format!("Grid points: {}\n", self.mesh_points));
        summary.push_str(&format!(
            "Zones: {} existing, {} inserted\n",
            self.zones_existing, self.zones_inserted
        ));
        summary.push_str(&format!(
            "Fetches: {} succeeded, {} failed\n",
            self.fetch_succeeded, self.fetch_failed
        ));
        summary.push_str(&format!("Raw samples: {}\n", self.samples));

        let rate = if self.samples == 0 {
            0.0
        } else {
            100.0 * self.transformed as f64 / self.samples as f64
        };
        summary.push_str(&format!(
            "Transformed: {} ({:.1}%), discarded: {}\n",
            self.transformed,
            rate,
            self.discarded()
        ));

        if !self.discards.is_empty() {
            summary.push_str("\nDiscards by reason:\n");
            for (reason, count) in &self.discards {
                summary.push_str(&format!("  {}: {}\n", reason, count));
            }
        }

        if !self.field_violations.is_empty() {
            let mut violations: Vec<_> = self.field_violations.iter().collect();
            violations.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

            summary.push_str("\nTop field violations:\n");
            for (field, count) in violations.into_iter().take(5) {
                summary.push_str(&format!("  {}: {}\n", field, count));
            }
        }

        if !self.discard_examples.is_empty() {
            summary.push_str(&format!(
                "\nFirst {} discards:\n",
                self.discard_examples.len()
            ));
            for (i, example) in self.discard_examples.iter().enumerate() {
                summary.push_str(&format!("  {}. {}\n", i + 1, example));
            }
        }

        match &self.load {
            Some(outcome) => {
                summary.push_str(&format!(
                    "\nLoaded into {}: {} row(s), {} failed\n",
                    outcome.table, outcome.loaded, outcome.failed
                ));
                if let Some(location) = &outcome.location {
                    summary.push_str(&format!("Output: {}\n", location.display()));
                }
            }
            None => summary.push_str("\nNo load attempted\n"),
        }

        summary
    }
}
