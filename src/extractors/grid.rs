use chrono::Utc;
use tracing::{debug, info};

use super::{FetchOutcome, Fetcher};
use crate::error::{EtlError, Result};
use crate::models::{Mesh, RawSample};
use crate::utils::ProgressReporter;

/// Samples extracted from a grid plus per-fetch tallies
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub samples: Vec<RawSample>,
    /// Successful source fetches
    pub succeeded: usize,
    /// Failed source fetches
    pub failed: usize,
}

impl Extraction {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Current UTC time as fractional unix seconds
pub fn utc_now_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Query every source for every grid point
///
/// Points are visited latitude outer, longitude inner, and sources in the order
/// given. A point produces one sample holding the payloads of the sources that
/// succeeded; a point where every source failed produces none. The sample is
/// stamped with `clock()` at its first successful fetch.
pub fn extract_samples<F, C>(
    mesh: &Mesh,
    fetchers: &[F],
    clock: C,
    progress: &ProgressReporter,
) -> Result<Extraction>
where
    F: Fetcher,
    C: Fn() -> f64,
{
    if fetchers.is_empty() {
        return Err(EtlError::NoExtractors);
    }

    let mut extraction = Extraction::default();

    for point in mesh.points() {
        let mut sample: Option<RawSample> = None;

        for fetcher in fetchers {
            match fetcher.fetch(point.latitude, point.longitude) {
                FetchOutcome::Success(data) => {
                    extraction.succeeded += 1;
                    sample
                        .get_or_insert_with(|| RawSample::new(point, mesh.grid_size, clock()))
                        .insert_payload(fetcher.dataset(), data);
                }
                FetchOutcome::Failed => {
                    extraction.failed += 1;
                    debug!(dataset = %fetcher.dataset(), %point, "No payload for grid point");
                }
            }
        }

        if let Some(sample) = sample {
            extraction.samples.push(sample);
        }
        progress.increment(1);
    }

    info!(
        points = mesh.len(),
        samples = extraction.samples.len(),
        succeeded = extraction.succeeded,
        failed = extraction.failed,
        "Extraction finished"
    );

    Ok(extraction)
}
