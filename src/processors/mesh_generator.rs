use tracing::debug;

use crate::error::{EtlError, Result};
use crate::models::Mesh;
use crate::utils::constants::{
    MAX_LATITUDE, MAX_LONGITUDE, MIN_GRID_SIZE, MIN_LATITUDE, MIN_LONGITUDE,
};
use crate::utils::coordinates::{coordinate_units, is_whole_units, units_to_degrees};

/// Tile a bounding box into a mesh of rounded coordinates
///
/// Each axis starts at its max bound and steps down by `step` while the value
/// is strictly greater than the min bound, so every series covers `(min, max]`.
/// The min bound is never sampled, even when a step lands on it exactly.
///
/// Stepping happens in integer units of the coordinate precision, which keeps
/// the series free of accumulated floating point drift.
///
/// # Examples
/// ```
/// use zonegrid_etl::processors::generate_mesh;
///
/// let mesh = generate_mesh(19.55, 19.45, -99.05, -99.15, 0.05).unwrap();
/// assert_eq!(mesh.latitudes, vec![19.55, 19.5]);
/// assert_eq!(mesh.longitudes, vec![-99.05, -99.1]);
/// ```
pub fn generate_mesh(
    max_lat: f64,
    min_lat: f64,
    max_lon: f64,
    min_lon: f64,
    step: f64,
) -> Result<Mesh> {
    check_step(step)?;
    check_axis("latitude", max_lat, min_lat, MIN_LATITUDE, MAX_LATITUDE)?;
    check_axis("longitude", max_lon, min_lon, MIN_LONGITUDE, MAX_LONGITUDE)?;

    let latitudes = axis_series(max_lat, min_lat, step);
    let longitudes = axis_series(max_lon, min_lon, step);

    debug!(
        latitudes = latitudes.len(),
        longitudes = longitudes.len(),
        step,
        "Generated coordinate mesh"
    );

    Ok(Mesh::new(latitudes, longitudes, step))
}

fn check_step(step: f64) -> Result<()> {
    if !step.is_finite() || step < MIN_GRID_SIZE {
        return Err(EtlError::Config(format!(
            "Grid size must be at least {}, got {}",
            MIN_GRID_SIZE, step
        )));
    }
    if !is_whole_units(step) {
        return Err(EtlError::Config(format!(
            "Grid size {} is not a multiple of {}",
            step, MIN_GRID_SIZE
        )));
    }
    Ok(())
}

fn check_axis(name: &str, max: f64, min: f64, lower: f64, upper: f64) -> Result<()> {
    for (label, value) in [("max", max), ("min", min)] {
        if !value.is_finite() || !(lower..=upper).contains(&value) {
            return Err(EtlError::Config(format!(
                "{} {} bound {} is outside [{}, {}]",
                label, name, value, lower, upper
            )));
        }
    }

    if max <= min {
        return Err(EtlError::Config(format!(
            "max {} ({}) must be greater than min {} ({})",
            name, max, name, min
        )));
    }

    Ok(())
}

fn axis_series(max: f64, min: f64, step: f64) -> Vec<f64> {
    let min_units = coordinate_units(min);
    let step_units = coordinate_units(step);

    let mut series = Vec::new();
    let mut current = coordinate_units(max);
    while current > min_units {
        series.push(units_to_degrees(current));
        current -= step_units;
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_bound_reached_exactly_is_excluded() {
        let mesh = generate_mesh(19.55, 19.50, -99.05, -99.10, 0.05).unwrap();
        assert_eq!(mesh.latitudes, vec![19.55]);
        assert_eq!(mesh.longitudes, vec![-99.05]);
    }

    #[test]
    fn test_min_bound_not_reached_exactly() {
        let mesh = generate_mesh(19.55, 19.48, -99.05, -99.12, 0.05).unwrap();
        assert_eq!(mesh.latitudes, vec![19.55, 19.5]);
        assert_eq!(mesh.longitudes, vec![-99.05, -99.1]);
    }

    #[test]
    fn test_default_bounding_box() {
        let mesh = generate_mesh(19.55, 19.40, -99.05, -99.20, 0.05).unwrap();
        assert_eq!(mesh.latitudes, vec![19.55, 19.5, 19.45]);
        assert_eq!(mesh.longitudes, vec![-99.05, -99.1, -99.15]);
        assert_eq!(mesh.len(), 9);
    }

    #[test]
    fn test_max_is_rounded_before_stepping() {
        let mesh = generate_mesh(19.550004, 19.5, -99.0, -99.02, 0.01).unwrap();
        assert_eq!(mesh.latitudes, vec![19.55, 19.54, 19.53, 19.52, 19.51]);
        assert_eq!(mesh.longitudes, vec![-99.0, -99.01]);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_mesh(19.55, 19.40, -99.05, -99.20, 0.01).unwrap();
        let b = generate_mesh(19.55, 19.40, -99.05, -99.20, 0.01).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.latitudes.len(), 15);
        assert_eq!(*a.latitudes.last().unwrap(), 19.41);
    }

    #[test]
    fn test_invalid_preconditions() {
        // step
        assert!(generate_mesh(19.55, 19.40, -99.05, -99.20, 0.0).is_err());
        assert!(generate_mesh(19.55, 19.40, -99.05, -99.20, -0.05).is_err());
        assert!(generate_mesh(19.55, 19.40, -99.05, -99.20, 0.000001).is_err());
        assert!(generate_mesh(19.55, 19.40, -99.05, -99.20, f64::NAN).is_err());
        // ordering
        assert!(generate_mesh(19.40, 19.55, -99.05, -99.20, 0.05).is_err());
        assert!(generate_mesh(19.55, 19.55, -99.05, -99.20, 0.05).is_err());
        assert!(generate_mesh(19.55, 19.40, -99.20, -99.05, 0.05).is_err());
        // ranges
        assert!(generate_mesh(91.0, 19.40, -99.05, -99.20, 0.05).is_err());
        assert!(generate_mesh(19.55, 19.40, 181.0, -99.20, 0.05).is_err());
    }

    #[test]
    fn test_step_finer_than_precision_is_rejected() {
        let err = generate_mesh(19.55, 19.40, -99.05, -99.20, 0.000016).unwrap_err();
        assert!(err.to_string().contains("not a multiple"));
        assert!(generate_mesh(19.55, 19.40, -99.05, -99.20, 0.050001).is_err());
        assert!(generate_mesh(19.55, 19.40, -99.05, -99.20, 0.00002).is_ok());
    }

    #[test]
    fn test_smallest_step() {
        let mesh = generate_mesh(0.00003, 0.0, 0.00002, 0.0, 0.00001).unwrap();
        assert_eq!(mesh.latitudes, vec![0.00003, 0.00002, 0.00001]);
        assert_eq!(mesh.longitudes, vec![0.00002, 0.00001]);
    }
}
