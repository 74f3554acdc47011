use crate::error::{EtlError, Result};
use crate::utils::constants::{
    COORDINATE_SCALE, MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE,
};

/// Round a coordinate to the fixed precision used across the pipeline
///
/// # Examples
/// ```
/// use zonegrid_etl::utils::round_coordinate;
///
/// assert_eq!(round_coordinate(19.499999999), 19.5);
/// assert_eq!(round_coordinate(-99.123456), -99.12346);
/// ```
pub fn round_coordinate(value: f64) -> f64 {
    coordinate_units(value) as f64 / COORDINATE_SCALE
}

/// Integer representation of a rounded coordinate (1 unit = 0.00001 degrees)
///
/// Hashing and equality go through these units so that two floats that round
/// to the same coordinate always compare equal.
pub fn coordinate_units(value: f64) -> i64 {
    (value * COORDINATE_SCALE).round() as i64
}

pub fn units_to_degrees(units: i64) -> f64 {
    units as f64 / COORDINATE_SCALE
}

/// True when `value` is a whole number of coordinate units
///
/// Grid steps must pass this check so the mesh never steps by anything other
/// than the configured size.
pub fn is_whole_units(value: f64) -> bool {
    value.is_finite() && (value * COORDINATE_SCALE - coordinate_units(value) as f64).abs() < 1e-6
}

pub fn validate_latitude(latitude: f64) -> Result<()> {
    if !latitude.is_finite() || !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
        return Err(EtlError::InvalidCoordinate(format!(
            "Latitude {} is outside [{}, {}]",
            latitude, MIN_LATITUDE, MAX_LATITUDE
        )));
    }
    Ok(())
}

pub fn validate_longitude(longitude: f64) -> Result<()> {
    if !longitude.is_finite() || !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
        return Err(EtlError::InvalidCoordinate(format!(
            "Longitude {} is outside [{}, {}]",
            longitude, MIN_LONGITUDE, MAX_LONGITUDE
        )));
    }
    Ok(())
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    validate_latitude(latitude)?;
    validate_longitude(longitude)
}

/// Hide everything but the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("****{}", tail)
}

/// Replace every occurrence of `secret` in `text` with its masked form
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, &mask_secret(secret))
}
