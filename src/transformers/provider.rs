use serde_json::{Map, Number, Value};
use std::fmt;
use std::marker::PhantomData;
use tracing::warn;
use validator::Validate;

use crate::models::{Dataset, NormalizedRecord, RawSample};
use crate::processors::ZoneTable;
use crate::utils::coordinates::validate_coordinates;
use crate::validation::{FieldViolation, NumericKind, RuleSet};

use super::shapes::{AirQualityShape, RecordShape, WeatherShape};

/// Why a raw sample produced no record
#[derive(Debug, Clone, PartialEq)]
pub enum Discard {
    /// Sample or provider payload is missing a field or has the wrong shape
    Structure { reason: String },
    /// A projected field broke its rule
    Invalid(FieldViolation),
    /// No zone exists for the sample's coordinate
    UnresolvedZone { latitude: f64, longitude: f64 },
}

impl Discard {
    fn structure(reason: impl Into<String>) -> Self {
        Discard::Structure {
            reason: reason.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Discard::Structure { .. } => "structure",
            Discard::Invalid(_) => "validation",
            Discard::UnresolvedZone { .. } => "unresolved_zone",
        }
    }
}

impl fmt::Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discard::Structure { reason } => write!(f, "malformed sample: {}", reason),
            Discard::Invalid(violation) => write!(f, "invalid field: {}", violation),
            Discard::UnresolvedZone {
                latitude,
                longitude,
            } => write!(f, "no zone for ({}, {})", latitude, longitude),
        }
    }
}

/// Raw sample -> normalized record, or the reason it was dropped
pub trait Transformer {
    fn dataset(&self) -> Dataset;

    fn transform(&self, sample: &RawSample) -> Result<NormalizedRecord, Discard>;
}

/// Shared transform steps, parametrised by the record shape
///
/// 1. check sample metadata and the provider payload structure
/// 2. project provider fields onto normalized names
/// 3. validate against the shape's rule table
/// 4. resolve the zone id from the run's zone table
/// 5. coerce the timestamp to whole seconds
pub struct ProviderTransformer<'a, S: RecordShape> {
    zones: &'a ZoneTable,
    rules: RuleSet,
    _shape: PhantomData<S>,
}

pub type WeatherTransformer<'a> = ProviderTransformer<'a, WeatherShape>;
pub type AirQualityTransformer<'a> = ProviderTransformer<'a, AirQualityShape>;

impl<'a, S: RecordShape> ProviderTransformer<'a, S> {
    pub fn new(zones: &'a ZoneTable) -> Self {
        Self {
            zones,
            rules: S::rules(),
            _shape: PhantomData,
        }
    }

    fn check_structure<'s>(&self, sample: &'s RawSample) -> Result<&'s Map<String, Value>, Discard> {
        validate_coordinates(sample.latitude, sample.longitude)
            .map_err(|e| Discard::structure(e.to_string()))?;
        if !sample.grid_size.is_finite() || sample.grid_size <= 0.0 {
            return Err(Discard::structure(format!(
                "grid_size {} is not positive",
                sample.grid_size
            )));
        }
        if !sample.timestamp.is_finite() {
            return Err(Discard::structure("timestamp is not a finite number"));
        }

        let source = S::DATASET.source_key();
        let payload = sample
            .payload(S::DATASET)
            .ok_or_else(|| Discard::structure(format!("missing {} payload", source)))?;
        if !payload.is_object() {
            return Err(Discard::structure(format!("{} payload is not an object", source)));
        }

        let measurements = payload
            .pointer(S::MEASUREMENTS)
            .and_then(Value::as_object)
            .ok_or_else(|| {
                Discard::structure(format!("{} payload has no {} object", source, S::MEASUREMENTS))
            })?;

        for (raw, _) in S::PROJECTIONS {
            match measurements.get(*raw) {
                None => {
                    return Err(Discard::structure(format!(
                        "missing {}{}/{}",
                        source,
                        S::MEASUREMENTS,
                        raw
                    )))
                }
                Some(value) if NumericKind::of(value).is_none() => {
                    return Err(Discard::structure(format!(
                        "{}{}/{} has non-numeric value {}",
                        source,
                        S::MEASUREMENTS,
                        raw,
                        value
                    )))
                }
                Some(_) => {}
            }
        }

        Ok(measurements)
    }

    fn project(&self, sample: &RawSample, measurements: &Map<String, Value>) -> Result<Map<String, Value>, Discard> {
        let timestamp = Number::from_f64(sample.timestamp)
            .ok_or_else(|| Discard::structure("timestamp is not representable"))?;

        let mut fields = Map::new();
        fields.insert("recorded_at".to_string(), Value::Number(timestamp));
        for (raw, normalized) in S::PROJECTIONS {
            if let Some(value) = measurements.get(*raw) {
                fields.insert((*normalized).to_string(), value.clone());
            }
        }
        Ok(fields)
    }

    fn run(&self, sample: &RawSample) -> Result<NormalizedRecord, Discard> {
        let measurements = self.check_structure(sample)?;
        let fields = self.project(sample, measurements)?;
        self.rules.check(&fields).map_err(Discard::Invalid)?;

        let zone_id = self
            .zones
            .resolve(sample.latitude, sample.longitude)
            .ok_or(Discard::UnresolvedZone {
                latitude: sample.latitude,
                longitude: sample.longitude,
            })?;

        let recorded_at = sample.timestamp.floor() as i64;

        let record = S::build(zone_id, recorded_at, &fields)
            .ok_or_else(|| Discard::structure("projected record is incomplete"))?;
        let typed_check = match &record {
            NormalizedRecord::Weather(r) => r.validate(),
            NormalizedRecord::AirQuality(r) => r.validate(),
        };
        typed_check.map_err(|e| Discard::structure(e.to_string()))?;

        Ok(record)
    }
}

impl<S: RecordShape> Transformer for ProviderTransformer<'_, S> {
    fn dataset(&self) -> Dataset {
        S::DATASET
    }

    fn transform(&self, sample: &RawSample) -> Result<NormalizedRecord, Discard> {
        self.run(sample).inspect_err(|discard| {
            warn!(
                dataset = %S::DATASET,
                latitude = sample.latitude,
                longitude = sample.longitude,
                reason = discard.label(),
                "Discarding sample: {}",
                discard
            );
        })
    }
}

/// Transformer for the selected target table
pub fn transformer_for(dataset: Dataset, zones: &ZoneTable) -> Box<dyn Transformer + '_> {
    match dataset {
        Dataset::Weather => Box::new(WeatherTransformer::new(zones)),
        Dataset::AirQuality => Box::new(AirQualityTransformer::new(zones)),
    }
}
