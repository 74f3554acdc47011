/// Fractional digits every coordinate is rounded to before comparison or storage
pub const COORDINATE_PRECISION: u32 = 5;
pub const COORDINATE_SCALE: f64 = 100_000.0;

/// Smallest grid step that survives rounding to `COORDINATE_PRECISION`
pub const MIN_GRID_SIZE: f64 = 0.00001;

/// Geographic bounds
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Default bounding box (Mexico City)
pub const DEFAULT_MAX_LAT: f64 = 19.55;
pub const DEFAULT_MIN_LAT: f64 = 19.40;
pub const DEFAULT_MAX_LON: f64 = -99.05;
pub const DEFAULT_MIN_LON: f64 = -99.20;
pub const DEFAULT_GRID_SIZE: f64 = 0.05;

/// Physical limits used by the record rule tables
pub const ABSOLUTE_ZERO_CELSIUS: f64 = -273.15;
pub const MAX_HUMIDITY: f64 = 100.0;
pub const MAX_PRESSURE_PA: f64 = 108_000.0;

/// Source keys inside a raw sample's `data` mapping, also used as table names
pub const WEATHER_KEY: &str = "weather";
pub const AIR_QUALITY_KEY: &str = "air_quality";

/// OpenWeather endpoints
pub const OPEN_WEATHER_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const OPEN_WEATHER_AIR_POLLUTION_URL: &str = "http://api.openweathermap.org/data/2.5/air_pollution";
pub const OPEN_WEATHER_API_KEY_VAR: &str = "OPEN_WEATHER_API_KEY";

/// Processing defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ZONES_FILE: &str = "data/zones.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const ENV_PREFIX: &str = "ZONEGRID";

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
