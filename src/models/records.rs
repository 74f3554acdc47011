use serde::{Deserialize, Serialize};
use validator::Validate;

use super::dataset::Dataset;

/// Load-ready weather row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WeatherRecord {
    pub zone_id: u64,

    #[validate(range(min = 0))]
    pub recorded_at: i64,

    /// Degrees Celsius
    #[validate(range(min = -273.15))]
    pub temperature: f64,

    /// Percent
    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity: f64,

    /// Pascal
    #[validate(range(min = 0.0, max = 108000.0))]
    pub pressure: f64,
}

/// Load-ready air-quality row; all concentrations are non-negative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AirQualityRecord {
    pub zone_id: u64,

    #[validate(range(min = 0))]
    pub recorded_at: i64,

    #[validate(range(min = 0.0))]
    pub co: f64,
    #[validate(range(min = 0.0))]
    pub no: f64,
    #[validate(range(min = 0.0))]
    pub no2: f64,
    #[validate(range(min = 0.0))]
    pub o3: f64,
    #[validate(range(min = 0.0))]
    pub so2: f64,
    #[validate(range(min = 0.0))]
    pub pm2_5: f64,
    #[validate(range(min = 0.0))]
    pub pm10: f64,
    #[validate(range(min = 0.0))]
    pub nh3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", rename_all = "snake_case")]
pub enum NormalizedRecord {
    Weather(WeatherRecord),
    AirQuality(AirQualityRecord),
}

impl NormalizedRecord {
    pub fn dataset(&self) -> Dataset {
        match self {
            NormalizedRecord::Weather(_) => Dataset::Weather,
            NormalizedRecord::AirQuality(_) => Dataset::AirQuality,
        }
    }

    pub fn zone_id(&self) -> u64 {
        match self {
            NormalizedRecord::Weather(r) => r.zone_id,
            NormalizedRecord::AirQuality(r) => r.zone_id,
        }
    }

    pub fn recorded_at(&self) -> i64 {
        match self {
            NormalizedRecord::Weather(r) => r.recorded_at,
            NormalizedRecord::AirQuality(r) => r.recorded_at,
        }
    }

    pub fn as_weather(&self) -> Option<&WeatherRecord> {
        match self {
            NormalizedRecord::Weather(r) => Some(r),
            NormalizedRecord::AirQuality(_) => None,
        }
    }

    pub fn as_air_quality(&self) -> Option<&AirQualityRecord> {
        match self {
            NormalizedRecord::AirQuality(r) => Some(r),
            NormalizedRecord::Weather(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> WeatherRecord {
        WeatherRecord {
            zone_id: 7,
            recorded_at: 1_700_000_000,
            temperature: 15.2,
            humidity: 60.0,
            pressure: 101300.0,
        }
    }

    #[test]
    fn test_weather_record_ranges() {
        assert!(weather().validate().is_ok());

        let mut too_humid = weather();
        too_humid.humidity = 100.0001;
        assert!(too_humid.validate().is_err());

        let mut below_absolute_zero = weather();
        below_absolute_zero.temperature = -300.0;
        assert!(below_absolute_zero.validate().is_err());
    }

    #[test]
    fn test_normalized_accessors() {
        let record = NormalizedRecord::Weather(weather());
        assert_eq!(record.dataset(), Dataset::Weather);
        assert_eq!(record.zone_id(), 7);
        assert_eq!(record.recorded_at(), 1_700_000_000);
        assert!(record.as_weather().is_some());
        assert!(record.as_air_quality().is_none());
    }
}
