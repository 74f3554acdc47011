pub mod field_validator;
pub mod rules;

pub use field_validator::{FieldRule, FieldViolation, NumericKind, RuleSet, ViolationKind};
pub use rules::{air_quality_rules, weather_rules, POLLUTANTS};
