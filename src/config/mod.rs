pub mod secrets;
pub mod settings;

pub use secrets::Secrets;
pub use settings::{BoundingBox, PipelineSettings, SettingsOverrides, SourceSettings};
