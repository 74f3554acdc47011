use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coordinate::Coordinate;
use super::dataset::Dataset;

/// One grid point's provider responses, as extracted and before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub latitude: f64,
    pub longitude: f64,
    pub grid_size: f64,
    /// Unix seconds at extraction time, possibly fractional
    pub timestamp: f64,
    /// Provider payloads keyed by `Dataset::source_key`
    pub data: Map<String, Value>,
}

impl RawSample {
    pub fn new(coordinate: Coordinate, grid_size: f64, timestamp: f64) -> Self {
        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            grid_size,
            timestamp,
            data: Map::new(),
        }
    }

    pub fn with_payload(mut self, dataset: Dataset, payload: Value) -> Self {
        self.insert_payload(dataset, payload);
        self
    }

    pub fn insert_payload(&mut self, dataset: Dataset, payload: Value) {
        self.data.insert(dataset.source_key().to_string(), payload);
    }

    pub fn payload(&self, dataset: Dataset) -> Option<&Value> {
        self.data.get(dataset.source_key())
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn has_payloads(&self) -> bool {
        !self.data.is_empty()
    }
}
