use tracing::{error, info, warn};

use crate::config::PipelineSettings;
use crate::error::{EtlError, Result};
use crate::extractors::{extract_samples, utc_now_seconds, Fetcher};
use crate::models::{Mesh, NormalizedRecord};
use crate::processors::columnar::records_to_batch;
use crate::processors::{generate_mesh, reconcile_zones, RunReport};
use crate::stores::ZoneStore;
use crate::transformers::transformer_for;
use crate::utils::ProgressReporter;
use crate::writers::{LoadOutcome, RecordSink};

/// Sequences one batch run: mesh, zones, extract, transform, unify, load
///
/// Any stage-level failure ends the run before the load; per-sample failures
/// and load failures are tallied in the returned [`RunReport`].
pub struct Pipeline<Z: ZoneStore, K: RecordSink> {
    settings: PipelineSettings,
    store: Z,
    sink: K,
    fetchers: Vec<Box<dyn Fetcher>>,
    clock: fn() -> f64,
    quiet: bool,
}

impl<Z: ZoneStore, K: RecordSink> Pipeline<Z, K> {
    pub fn new(settings: PipelineSettings, store: Z, sink: K) -> Self {
        Self {
            settings,
            store,
            sink,
            fetchers: Vec::new(),
            clock: utc_now_seconds,
            quiet: true,
        }
    }

    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetchers.push(Box::new(fetcher));
        self
    }

    pub fn with_fetchers(mut self, fetchers: Vec<Box<dyn Fetcher>>) -> Self {
        self.fetchers.extend(fetchers);
        self
    }

    /// Source of extraction timestamps (fractional unix seconds)
    pub fn with_clock(mut self, clock: fn() -> f64) -> Self {
        self.clock = clock;
        self
    }

    /// Show a progress bar during extraction
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.quiet = !enabled;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn store(&self) -> &Z {
        &self.store
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_parts(self) -> (Z, K) {
        (self.store, self.sink)
    }

    fn build_mesh(&self) -> Result<Mesh> {
        let bounds = &self.settings.bounds;
        generate_mesh(
            bounds.max_lat,
            bounds.min_lat,
            bounds.max_lon,
            bounds.min_lon,
            self.settings.grid_size,
        )
    }

    pub fn run(&mut self) -> Result<RunReport> {
        self.settings.check()?;
        self.store.probe()?;
        self.sink.probe()?;

        let target = self.settings.target;
        let mut report = RunReport::new(target);

        let mesh = self.build_mesh()?;
        report.mesh_points = mesh.len();
        info!(
            latitudes = mesh.latitudes.len(),
            longitudes = mesh.longitudes.len(),
            points = mesh.len(),
            "Mesh generated"
        );

        let reconciliation = reconcile_zones(&mut self.store, &mesh)?;
        report.record_reconciliation(&reconciliation);

        if self.fetchers.is_empty() {
            return Err(EtlError::NoExtractors);
        }
        if !self.fetchers.iter().any(|f| f.dataset() == target) {
            warn!(table = %target, "No configured source feeds the target table");
        }

        let progress = ProgressReporter::new(mesh.len() as u64, "Extracting grid samples", self.quiet);
        let extraction = extract_samples(&mesh, &self.fetchers, self.clock, &progress)?;
        progress.finish_with_message(&format!("Extracted {} samples", extraction.samples.len()));
        report.record_extraction(&extraction);
        if extraction.samples.is_empty() {
            return Err(EtlError::NoSamples);
        }

        let transformer = transformer_for(target, &reconciliation.table);
        let mut records: Vec<NormalizedRecord> = Vec::with_capacity(extraction.samples.len());
        for sample in &extraction.samples {
            match transformer.transform(sample) {
                Ok(record) => records.push(record),
                Err(discard) => report.record_discard(&discard),
            }
        }
        report.transformed = records.len();
        info!(
            table = %target,
            transformed = records.len(),
            discarded = report.discarded(),
            "Transformation finished"
        );
        if records.is_empty() {
            return Err(EtlError::NothingTransformed(target.to_string()));
        }

        let batch = records_to_batch(target, &records)?;
        let outcome = match self.sink.load(target, &batch) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(table = %target, rows = batch.num_rows(), error = %e, "Load failed");
                LoadOutcome::new(target, 0, batch.num_rows())
            }
        };
        if outcome.is_complete() {
            info!(table = %outcome.table, rows = outcome.loaded, "Load finished");
        } else {
            warn!(
                table = %outcome.table,
                loaded = outcome.loaded,
                failed = outcome.failed,
                "Load finished with failures"
            );
        }
        report.load = Some(outcome);

        Ok(report)
    }
}
