use crate::utils::constants::{ABSOLUTE_ZERO_CELSIUS, MAX_HUMIDITY, MAX_PRESSURE_PA};

use super::field_validator::{FieldRule, RuleSet};

/// Pollutant fields reported by the air-quality provider, in output column order
pub const POLLUTANTS: [&str; 8] = ["co", "no", "no2", "o3", "so2", "pm2_5", "pm10", "nh3"];

/// Rules for a projected weather record
pub fn weather_rules() -> RuleSet {
    RuleSet::new()
        .rule("recorded_at", FieldRule::number().min(0.0))
        .rule("temperature", FieldRule::number().min(ABSOLUTE_ZERO_CELSIUS))
        .rule("humidity", FieldRule::number().between(0.0, MAX_HUMIDITY))
        .rule("pressure", FieldRule::number().between(0.0, MAX_PRESSURE_PA))
}

/// Rules for a projected air-quality record
pub fn air_quality_rules() -> RuleSet {
    POLLUTANTS.iter().fold(
        RuleSet::new().rule("recorded_at", FieldRule::number().min(0.0)),
        |rules, &field| rules.rule(field, FieldRule::number().min(0.0)),
    )
}
