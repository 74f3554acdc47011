use thiserror::Error;

pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Missing required secret: {0}")]
    MissingSecret(&'static str),

    #[error("Connectivity check failed for {target}: {message}")]
    Connectivity { target: String, message: String },

    #[error("Zone reconciliation failed: {0}")]
    ZoneReconciliation(String),

    #[error("No extractors configured")]
    NoExtractors,

    #[error("Extraction produced no samples")]
    NoSamples,

    #[error("Transformation produced no records for {0}")]
    NothingTransformed(String),

    #[error("{failed} row(s) failed to load into {table}")]
    LoadFailed { table: String, failed: usize },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
