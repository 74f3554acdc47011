//! Extraction seam: one fetcher per provider source, driven over the grid by [`extract_samples`]

pub mod grid;
pub mod open_weather;

use serde_json::Value;

use crate::models::Dataset;

pub use grid::{extract_samples, utc_now_seconds, Extraction};
pub use open_weather::OpenWeatherFetcher;

/// Result of a single provider call
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(Value),
    Failed,
}

/// A provider source that can be queried for one coordinate
///
/// Implementations own retries, timeouts and secret handling; a failure is
/// reported as [`FetchOutcome::Failed`] and never aborts the run.
pub trait Fetcher {
    fn dataset(&self) -> Dataset;

    fn fetch(&self, latitude: f64, longitude: f64) -> FetchOutcome;
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn dataset(&self) -> Dataset {
        (**self).dataset()
    }

    fn fetch(&self, latitude: f64, longitude: f64) -> FetchOutcome {
        (**self).fetch(latitude, longitude)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn dataset(&self) -> Dataset {
        (**self).dataset()
    }

    fn fetch(&self, latitude: f64, longitude: f64) -> FetchOutcome {
        (**self).fetch(latitude, longitude)
    }
}
