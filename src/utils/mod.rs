pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::{coordinate_units, mask_secret, redact, round_coordinate, validate_coordinates};
pub use filename::{load_file_path, unique_load_path};
pub use progress::ProgressReporter;
