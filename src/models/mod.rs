pub mod coordinate;
pub mod dataset;
pub mod mesh;
pub mod records;
pub mod sample;
pub mod zone;

pub use coordinate::{Coordinate, CoordinateKey};
pub use dataset::Dataset;
pub use mesh::Mesh;
pub use records::{AirQualityRecord, NormalizedRecord, WeatherRecord};
pub use sample::RawSample;
pub use zone::Zone;
