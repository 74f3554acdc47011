use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::coordinates::{coordinate_units, round_coordinate, units_to_degrees};

/// Hashable identity of a rounded coordinate pair, in 0.00001 degree units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordinateKey {
    pub lat_units: i64,
    pub lon_units: i64,
}

impl CoordinateKey {
    pub fn of(latitude: f64, longitude: f64) -> Self {
        Self {
            lat_units: coordinate_units(latitude),
            lon_units: coordinate_units(longitude),
        }
    }

    pub fn to_coordinate(self) -> Coordinate {
        Coordinate {
            latitude: units_to_degrees(self.lat_units),
            longitude: units_to_degrees(self.lon_units),
        }
    }
}

/// A grid point, always stored rounded to the pipeline precision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: round_coordinate(latitude),
            longitude: round_coordinate(longitude),
        }
    }

    pub fn key(&self) -> CoordinateKey {
        CoordinateKey::of(self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}
