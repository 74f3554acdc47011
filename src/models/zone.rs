use serde::{Deserialize, Serialize};
use validator::Validate;

use super::coordinate::{Coordinate, CoordinateKey};

/// Persisted grid cell; the join key between samples and fact rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Zone {
    pub id: u64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Zone {
    pub fn new(id: u64, coordinate: Coordinate) -> Self {
        Self {
            id,
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn key(&self) -> CoordinateKey {
        CoordinateKey::of(self.latitude, self.longitude)
    }
}
