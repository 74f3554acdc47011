use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::models::Dataset;
use crate::utils::constants::{
    DEFAULT_GRID_SIZE, DEFAULT_MAX_LAT, DEFAULT_MAX_LON, DEFAULT_MIN_LAT, DEFAULT_MIN_LON,
    DEFAULT_OUTPUT_DIR, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_ZONES_FILE, ENV_PREFIX,
    MIN_GRID_SIZE, OPEN_WEATHER_AIR_POLLUTION_URL, OPEN_WEATHER_WEATHER_URL,
};
use crate::utils::coordinates::is_whole_units;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_bounds"))]
pub struct BoundingBox {
    #[validate(range(min = -90.0, max = 90.0))]
    pub max_lat: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub min_lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub max_lon: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub min_lon: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            max_lat: DEFAULT_MAX_LAT,
            min_lat: DEFAULT_MIN_LAT,
            max_lon: DEFAULT_MAX_LON,
            min_lon: DEFAULT_MIN_LON,
        }
    }
}

fn invalid(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

fn validate_bounds(bounds: &BoundingBox) -> std::result::Result<(), ValidationError> {
    let values = [bounds.max_lat, bounds.min_lat, bounds.max_lon, bounds.min_lon];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(invalid(
            "non_finite_bound",
            "bounding box values must be finite numbers".to_string(),
        ));
    }
    if bounds.max_lat <= bounds.min_lat {
        return Err(invalid(
            "latitude_order",
            format!(
                "max_lat ({}) must be greater than min_lat ({})",
                bounds.max_lat, bounds.min_lat
            ),
        ));
    }
    if bounds.max_lon <= bounds.min_lon {
        return Err(invalid(
            "longitude_order",
            format!(
                "max_lon ({}) must be greater than min_lon ({})",
                bounds.max_lon, bounds.min_lon
            ),
        ));
    }
    Ok(())
}

/// One provider endpoint queried per grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SourceSettings {
    pub dataset: Dataset,

    #[validate(length(min = 1))]
    pub base_url: String,

    /// Constant query parameters appended to every request
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl SourceSettings {
    pub fn open_weather_weather() -> Self {
        Self {
            dataset: Dataset::Weather,
            base_url: OPEN_WEATHER_WEATHER_URL.to_string(),
            params: BTreeMap::from([
                ("units".to_string(), "metric".to_string()),
                ("lang".to_string(), "es".to_string()),
            ]),
        }
    }

    pub fn open_weather_air_pollution() -> Self {
        Self {
            dataset: Dataset::AirQuality,
            base_url: OPEN_WEATHER_AIR_POLLUTION_URL.to_string(),
            params: BTreeMap::from([("lang".to_string(), "es".to_string())]),
        }
    }
}

fn default_grid_size() -> f64 {
    DEFAULT_GRID_SIZE
}

fn default_target() -> Dataset {
    Dataset::Weather
}

fn default_zones_file() -> PathBuf {
    PathBuf::from(DEFAULT_ZONES_FILE)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_sources() -> Vec<SourceSettings> {
    vec![
        SourceSettings::open_weather_weather(),
        SourceSettings::open_weather_air_pollution(),
    ]
}

fn validate_grid_size(settings: &PipelineSettings) -> std::result::Result<(), ValidationError> {
    if !settings.grid_size.is_finite() {
        return Err(invalid(
            "non_finite_grid_size",
            "grid_size must be a finite number".to_string(),
        ));
    }
    if !is_whole_units(settings.grid_size) {
        return Err(invalid(
            "grid_size_precision",
            format!(
                "grid_size ({}) must be a multiple of {}",
                settings.grid_size, MIN_GRID_SIZE
            ),
        ));
    }
    Ok(())
}

/// Everything a pipeline run needs apart from secrets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_grid_size"))]
pub struct PipelineSettings {
    #[serde(default)]
    #[validate(nested)]
    pub bounds: BoundingBox,

    #[serde(default = "default_grid_size")]
    #[validate(range(min = 0.00001))]
    pub grid_size: f64,

    #[serde(default = "default_target")]
    pub target: Dataset,

    #[serde(default = "default_zones_file")]
    pub zones_file: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,

    #[serde(default = "default_sources")]
    #[validate(nested)]
    pub sources: Vec<SourceSettings>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            bounds: BoundingBox::default(),
            grid_size: default_grid_size(),
            target: default_target(),
            zones_file: default_zones_file(),
            output_dir: default_output_dir(),
            request_timeout_secs: default_request_timeout(),
            sources: default_sources(),
        }
    }
}

/// Command-line values that win over file and environment settings
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub max_lat: Option<f64>,
    pub min_lat: Option<f64>,
    pub max_lon: Option<f64>,
    pub min_lon: Option<f64>,
    pub grid_size: Option<f64>,
    pub target: Option<Dataset>,
    pub zones_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl PipelineSettings {
    /// Layer defaults, an optional settings file, `ZONEGRID_*` variables and overrides
    ///
    /// Nested keys use a double underscore in the environment, e.g.
    /// `ZONEGRID_BOUNDS__MAX_LAT=19.6`.
    pub fn load(path: Option<&Path>, overrides: &SettingsOverrides) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let path_string = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
        let settings: PipelineSettings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("bounds.max_lat", overrides.max_lat)?
            .set_override_option("bounds.min_lat", overrides.min_lat)?
            .set_override_option("bounds.max_lon", overrides.max_lon)?
            .set_override_option("bounds.min_lon", overrides.min_lon)?
            .set_override_option("grid_size", overrides.grid_size)?
            .set_override_option("target", overrides.target.map(|t| t.table_name()))?
            .set_override_option("zones_file", path_string(&overrides.zones_file))?
            .set_override_option("output_dir", path_string(&overrides.output_dir))?
            .build()?
            .try_deserialize()?;

        settings.check()?;
        debug!(?settings, "Loaded pipeline settings");
        Ok(settings)
    }

    /// Reject invalid settings outright; nothing is clamped
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        Ok(())
    }

    /// Configured sources, in fetch order
    pub fn sources(&self) -> &[SourceSettings] {
        &self.sources
    }
}
