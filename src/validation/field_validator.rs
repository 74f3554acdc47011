use serde_json::{Map, Value};
use std::fmt;

/// Primitive numeric JSON kinds a field may hold
///
/// Strings are never numbers here, even when they parse as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Float,
}

impl NumericKind {
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(NumericKind::Integer),
            Value::Number(_) => Some(NumericKind::Float),
            _ => None,
        }
    }
}

const INTEGER_ONLY: &[NumericKind] = &[NumericKind::Integer];
const ANY_NUMBER: &[NumericKind] = &[NumericKind::Integer, NumericKind::Float];

/// Type and range constraint for a single field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    pub kinds: &'static [NumericKind],
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FieldRule {
    /// Integer or float
    pub fn number() -> Self {
        Self {
            kinds: ANY_NUMBER,
            min: None,
            max: None,
        }
    }

    pub fn integer() -> Self {
        Self {
            kinds: INTEGER_ONLY,
            min: None,
            max: None,
        }
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn between(self, min: f64, max: f64) -> Self {
        self.min(min).max(max)
    }

    pub fn check(&self, field: &str, value: Option<&Value>) -> Result<(), FieldViolation> {
        let violation = |kind: ViolationKind| FieldViolation {
            field: field.to_string(),
            value: value.cloned(),
            kind,
        };

        let value = match value {
            Some(Value::Null) | None => return Err(violation(ViolationKind::Missing)),
            Some(v) => v,
        };

        let kind = NumericKind::of(value).ok_or_else(|| violation(ViolationKind::WrongType))?;
        if !self.kinds.contains(&kind) {
            return Err(violation(ViolationKind::WrongType));
        }

        let number = value.as_f64().unwrap_or(f64::NAN);
        if let Some(min) = self.min {
            if number.is_nan() || number < min {
                return Err(violation(ViolationKind::BelowMin(min)));
            }
        }
        if let Some(max) = self.max {
            if number.is_nan() || number > max {
                return Err(violation(ViolationKind::AboveMax(max)));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViolationKind {
    Missing,
    WrongType,
    BelowMin(f64),
    AboveMax(f64),
}

/// First failing field of a record, with the offending value
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub value: Option<Value>,
    pub kind: ViolationKind,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self
            .value
            .as_ref()
            .map_or_else(|| "<absent>".to_string(), |v| v.to_string());
        match self.kind {
            ViolationKind::Missing => write!(f, "{} is missing", self.field),
            ViolationKind::WrongType => write!(f, "{} has non-numeric value {}", self.field, value),
            ViolationKind::BelowMin(min) => {
                write!(f, "{} value {} is below minimum {}", self.field, value, min)
            }
            ViolationKind::AboveMax(max) => {
                write!(f, "{} value {} is above maximum {}", self.field, value, max)
            }
        }
    }
}

impl std::error::Error for FieldViolation {}

/// Ordered field -> rule table
///
/// Only declared fields are checked; extra fields in a record pass through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<(&'static str, FieldRule)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, field: &'static str, rule: FieldRule) -> Self {
        self.rules.push((field, rule));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|(field, _)| *field)
    }

    /// Check fields in declaration order, stopping at the first violation
    pub fn check(&self, record: &Map<String, Value>) -> Result<(), FieldViolation> {
        for (field, rule) in &self.rules {
            rule.check(field, record.get(*field))?;
        }
        Ok(())
    }

    pub fn is_valid(&self, record: &Map<String, Value>) -> bool {
        self.check(record).is_ok()
    }
}
