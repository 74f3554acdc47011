use std::collections::HashSet;

use super::coordinate::{Coordinate, CoordinateKey};

/// Latitude and longitude series whose cross product is the sampled grid
///
/// Both series run from their max bound down towards (but excluding) the min bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    pub grid_size: f64,
}

impl Mesh {
    pub fn new(latitudes: Vec<f64>, longitudes: Vec<f64>, grid_size: f64) -> Self {
        Self {
            latitudes,
            longitudes,
            grid_size,
        }
    }

    /// Number of grid points (|lat| x |lon|)
    pub fn len(&self) -> usize {
        self.latitudes.len() * self.longitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grid points, latitude outer and longitude inner
    pub fn points(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.latitudes.iter().flat_map(move |&lat| {
            self.longitudes
                .iter()
                .map(move |&lon| Coordinate::new(lat, lon))
        })
    }

    pub fn candidate_keys(&self) -> HashSet<CoordinateKey> {
        self.points().map(|p| p.key()).collect()
    }
}
