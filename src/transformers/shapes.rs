use serde_json::{Map, Value};

use crate::models::{AirQualityRecord, Dataset, NormalizedRecord, WeatherRecord};
use crate::validation::{air_quality_rules, weather_rules, RuleSet};

/// Where a dataset's measurements sit in the provider payload and how they are renamed
pub trait RecordShape {
    const DATASET: Dataset;

    /// JSON pointer from the provider payload to the measurement object
    const MEASUREMENTS: &'static str;

    /// (provider field, normalized field) pairs
    const PROJECTIONS: &'static [(&'static str, &'static str)];

    fn rules() -> RuleSet;

    /// Assemble the typed record from already-validated projected fields
    fn build(zone_id: u64, recorded_at: i64, fields: &Map<String, Value>) -> Option<NormalizedRecord>;
}

fn number(fields: &Map<String, Value>, name: &str) -> Option<f64> {
    fields.get(name).and_then(Value::as_f64)
}

/// OpenWeather current weather: `main.{temp, humidity, pressure}`
pub struct WeatherShape;

impl RecordShape for WeatherShape {
    const DATASET: Dataset = Dataset::Weather;
    const MEASUREMENTS: &'static str = "/main";
    const PROJECTIONS: &'static [(&'static str, &'static str)] = &[
        ("temp", "temperature"),
        ("humidity", "humidity"),
        ("pressure", "pressure"),
    ];

    fn rules() -> RuleSet {
        weather_rules()
    }

    fn build(zone_id: u64, recorded_at: i64, fields: &Map<String, Value>) -> Option<NormalizedRecord> {
        Some(NormalizedRecord::Weather(WeatherRecord {
            zone_id,
            recorded_at,
            temperature: number(fields, "temperature")?,
            humidity: number(fields, "humidity")?,
            pressure: number(fields, "pressure")?,
        }))
    }
}

/// OpenWeather air pollution: `list[0].components.{co, no, ...}`
pub struct AirQualityShape;

impl RecordShape for AirQualityShape {
    const DATASET: Dataset = Dataset::AirQuality;
    const MEASUREMENTS: &'static str = "/list/0/components";
    const PROJECTIONS: &'static [(&'static str, &'static str)] = &[
        ("co", "co"),
        ("no", "no"),
        ("no2", "no2"),
        ("o3", "o3"),
        ("so2", "so2"),
        ("pm2_5", "pm2_5"),
        ("pm10", "pm10"),
        ("nh3", "nh3"),
    ];

    fn rules() -> RuleSet {
        air_quality_rules()
    }

    fn build(zone_id: u64, recorded_at: i64, fields: &Map<String, Value>) -> Option<NormalizedRecord> {
        Some(NormalizedRecord::AirQuality(AirQualityRecord {
            zone_id,
            recorded_at,
            co: number(fields, "co")?,
            no: number(fields, "no")?,
            no2: number(fields, "no2")?,
            o3: number(fields, "o3")?,
            so2: number(fields, "so2")?,
            pm2_5: number(fields, "pm2_5")?,
            pm10: number(fields, "pm10")?,
            nh3: number(fields, "nh3")?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::POLLUTANTS;

    #[test]
    fn test_projections_line_up_with_rules() {
        let weather_fields: Vec<_> = WeatherShape::rules().fields().skip(1).collect();
        let projected: Vec<_> = WeatherShape::PROJECTIONS.iter().map(|(_, to)| *to).collect();
        assert_eq!(weather_fields, projected);

        let air_projected: Vec<_> = AirQualityShape::PROJECTIONS.iter().map(|(_, to)| *to).collect();
        assert_eq!(air_projected, POLLUTANTS.to_vec());
    }

    #[test]
    fn test_build_requires_every_field() {
        let mut fields = Map::new();
        fields.insert("temperature".to_string(), Value::from(15.2));
        fields.insert("humidity".to_string(), Value::from(60));
        assert!(WeatherShape::build(1, 0, &fields).is_none());

        fields.insert("pressure".to_string(), Value::from(101300));
        let record = WeatherShape::build(1, 0, &fields).unwrap();
        assert_eq!(record.dataset(), Dataset::Weather);
    }
}
