pub mod provider;
pub mod shapes;

pub use provider::{
    transformer_for, AirQualityTransformer, Discard, ProviderTransformer, Transformer,
    WeatherTransformer,
};
pub use shapes::{AirQualityShape, RecordShape, WeatherShape};
